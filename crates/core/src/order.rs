//! Order numbering and the customer-facing order timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::OrderStatus;

/// Prefix of every order number.
pub const ORDER_NUMBER_PREFIX: &str = "LX-";

/// Build an order number from random bits: `LX-` and 8 uppercase hex digits.
///
/// ```
/// use luxora_core::order::order_number;
///
/// assert_eq!(order_number(0x00ab_12cd), "LX-00AB12CD");
/// ```
#[must_use]
pub fn order_number(bits: u32) -> String {
    format!("{ORDER_NUMBER_PREFIX}{bits:08X}")
}

/// Check the shape of an order number taken from a URL.
#[must_use]
pub fn is_order_number(s: &str) -> bool {
    s.strip_prefix(ORDER_NUMBER_PREFIX).is_some_and(|hex| {
        hex.len() == 8 && hex.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    })
}

/// One step of the order timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStep {
    pub label: &'static str,
    pub completed: bool,
    /// The step the order is currently at.
    pub current: bool,
    /// Known for the first step and for the step matching the last update.
    pub at: Option<DateTime<Utc>>,
}

const PROGRESSION: [(OrderStatus, &str); 4] = [
    (OrderStatus::Pending, "Placed"),
    (OrderStatus::Processing, "Processing"),
    (OrderStatus::Shipped, "Shipped"),
    (OrderStatus::Delivered, "Delivered"),
];

const fn rank(status: OrderStatus) -> usize {
    match status {
        OrderStatus::Pending | OrderStatus::Cancelled => 0,
        OrderStatus::Processing => 1,
        OrderStatus::Shipped => 2,
        OrderStatus::Delivered => 3,
    }
}

/// Timeline for an order placed at `placed_at` and last updated at `updated_at`.
#[must_use]
pub fn timeline(
    status: OrderStatus,
    placed_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Vec<TimelineStep> {
    if status == OrderStatus::Cancelled {
        return vec![
            TimelineStep {
                label: "Placed",
                completed: true,
                current: false,
                at: Some(placed_at),
            },
            TimelineStep {
                label: "Cancelled",
                completed: true,
                current: true,
                at: Some(updated_at),
            },
        ];
    }

    let reached = rank(status);
    PROGRESSION
        .iter()
        .enumerate()
        .map(|(i, (_, label))| {
            let at = if i == 0 {
                Some(placed_at)
            } else if i == reached {
                Some(updated_at)
            } else {
                None
            };
            TimelineStep {
                label,
                completed: i <= reached,
                current: i == reached,
                at,
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_order_number_shape() {
        let number = order_number(u32::MAX);
        assert_eq!(number, "LX-FFFFFFFF");
        assert!(is_order_number(&number));
        assert!(is_order_number("LX-0000A1B2"));
        assert!(!is_order_number("LX-0000a1b2"));
        assert!(!is_order_number("LX-123"));
        assert!(!is_order_number("42"));
    }

    #[test]
    fn test_timeline_for_shipped_order() {
        let placed = Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap();
        let updated = Utc.with_ymd_and_hms(2026, 4, 3, 8, 0, 0).unwrap();
        let steps = timeline(OrderStatus::Shipped, placed, updated);

        let completed: Vec<bool> = steps.iter().map(|s| s.completed).collect();
        assert_eq!(completed, [true, true, true, false]);
        assert_eq!(steps[2].label, "Shipped");
        assert!(steps[2].current);
        assert_eq!(steps[2].at, Some(updated));
        assert_eq!(steps[0].at, Some(placed));
        assert_eq!(steps[1].at, None);
    }

    #[test]
    fn test_timeline_for_new_order() {
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap();
        let steps = timeline(OrderStatus::Pending, now, now);
        assert!(steps[0].completed && steps[0].current);
        assert!(steps.iter().skip(1).all(|s| !s.completed));
    }

    #[test]
    fn test_timeline_for_cancelled_order() {
        let placed = Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap();
        let steps = timeline(OrderStatus::Cancelled, placed, placed);
        let labels: Vec<&str> = steps.iter().map(|s| s.label).collect();
        assert_eq!(labels, ["Placed", "Cancelled"]);
    }
}
