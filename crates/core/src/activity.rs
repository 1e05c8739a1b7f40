//! Dashboard activity feed.
//!
//! Orders, new products and reviews are loaded independently, tagged with
//! their kind, then merged newest-first and cut to the requested size.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How far back the feed looks.
pub const ACTIVITY_WINDOW_DAYS: i64 = 7;

/// Default number of entries returned.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;

/// Hard cap on entries returned.
pub const MAX_ACTIVITY_LIMIT: usize = 50;

/// Kind of activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Order,
    Product,
    Review,
}

/// A single feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// ID of the order, product or review.
    pub id: i32,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Earliest timestamp included in the feed.
#[must_use]
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(ACTIVITY_WINDOW_DAYS)
}

/// Normalize a requested limit.
#[must_use]
pub fn effective_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT)
}

/// Merge independently loaded sources into one feed.
///
/// Entries are ordered by timestamp, newest first; equal timestamps fall back
/// to kind and then id so the order is stable between requests.
#[must_use]
pub fn merge_activity<I>(sources: I, limit: usize) -> Vec<ActivityItem>
where
    I: IntoIterator<Item = Vec<ActivityItem>>,
{
    let mut feed: Vec<ActivityItem> = sources.into_iter().flatten().collect();
    feed.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| b.id.cmp(&a.id))
    });
    feed.truncate(limit);
    feed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn item(kind: ActivityKind, id: i32, hour: u32) -> ActivityItem {
        ActivityItem {
            kind,
            id,
            title: format!("{kind:?} {id}"),
            description: String::new(),
            timestamp: Utc.with_ymd_and_hms(2026, 5, 4, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_merge_sorts_newest_first_and_truncates() {
        let orders = vec![item(ActivityKind::Order, 1, 9), item(ActivityKind::Order, 2, 14)];
        let products = vec![item(ActivityKind::Product, 7, 11)];
        let reviews = vec![item(ActivityKind::Review, 3, 16), item(ActivityKind::Review, 4, 8)];

        let feed = merge_activity([orders, products, reviews], 4);

        let ids: Vec<(ActivityKind, i32)> = feed.iter().map(|i| (i.kind, i.id)).collect();
        assert_eq!(
            ids,
            [
                (ActivityKind::Review, 3),
                (ActivityKind::Order, 2),
                (ActivityKind::Product, 7),
                (ActivityKind::Order, 1),
            ]
        );
    }

    #[test]
    fn test_merge_ties_are_deterministic() {
        let feed = merge_activity(
            [
                vec![item(ActivityKind::Review, 1, 10)],
                vec![item(ActivityKind::Order, 5, 10), item(ActivityKind::Order, 6, 10)],
            ],
            10,
        );
        let ids: Vec<i32> = feed.iter().map(|i| i.id).collect();
        assert_eq!(ids, [6, 5, 1]);
    }

    #[test]
    fn test_effective_limit() {
        assert_eq!(effective_limit(None), DEFAULT_ACTIVITY_LIMIT);
        assert_eq!(effective_limit(Some(0)), 1);
        assert_eq!(effective_limit(Some(500)), MAX_ACTIVITY_LIMIT);
    }

    #[test]
    fn test_serialized_type_tag() {
        let json = serde_json::to_value(item(ActivityKind::Product, 1, 1)).unwrap();
        assert_eq!(json["type"], "product");
    }
}
