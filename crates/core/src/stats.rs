//! Dashboard statistics helpers.
//!
//! Dashboards compare the current month-to-date against the whole previous
//! calendar month and chart revenue over a trailing window of months. The
//! SQL side only sums and counts; period boundaries, percentage change and
//! gap filling live here so both dashboards agree.

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Months shown on the revenue chart.
pub const REVENUE_SERIES_MONTHS: u32 = 12;

/// Month-to-date and previous-month boundaries, all in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingPeriods {
    /// First instant of the current month.
    pub current_start: DateTime<Utc>,
    /// End of the current period (the time the report was requested).
    pub current_end: DateTime<Utc>,
    /// First instant of the previous month.
    pub previous_start: DateTime<Utc>,
}

impl ReportingPeriods {
    /// Periods for a report requested at `now`.
    #[must_use]
    pub fn month_to_date(now: DateTime<Utc>) -> Self {
        let current_month = first_of_month(now.date_naive());
        let previous_month = current_month
            .checked_sub_months(Months::new(1))
            .unwrap_or(current_month);

        Self {
            current_start: start_of_day(current_month),
            current_end: now,
            previous_start: start_of_day(previous_month),
        }
    }

    /// End of the previous period (exclusive), the start of the current one.
    #[must_use]
    pub const fn previous_end(&self) -> DateTime<Utc> {
        self.current_start
    }
}

/// First calendar day of the month containing `date`.
#[must_use]
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// Percentage change from `previous` to `current`, rounded to one decimal.
///
/// With no baseline the change is reported as 100% growth when there is any
/// current activity and 0% otherwise.
///
/// ```
/// use luxora_core::stats::percent_change;
/// use rust_decimal::Decimal;
///
/// assert_eq!(percent_change(Decimal::new(150, 0), Decimal::new(100, 0)), Decimal::new(50, 0));
/// assert_eq!(percent_change(Decimal::new(5, 0), Decimal::ZERO), Decimal::new(100, 0));
/// ```
#[must_use]
pub fn percent_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return if current > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
    }

    ((current - previous) / previous.abs() * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// A metric for the current and previous period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub current: Decimal,
    pub previous: Decimal,
    pub change_percent: Decimal,
}

impl MetricComparison {
    /// Compare two amounts.
    #[must_use]
    pub fn new(current: Decimal, previous: Decimal) -> Self {
        Self {
            current,
            previous,
            change_percent: percent_change(current, previous),
        }
    }

    /// Compare two counts.
    #[must_use]
    pub fn from_counts(current: i64, previous: i64) -> Self {
        Self::new(Decimal::from(current), Decimal::from(previous))
    }
}

/// Average order value, rounded to cents; zero when there are no orders.
#[must_use]
pub fn average_order_value(revenue: Decimal, orders: i64) -> Decimal {
    if orders <= 0 {
        return Decimal::ZERO;
    }
    crate::money::round_cents(revenue / Decimal::from(orders))
}

/// One month on the revenue chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    /// First day of the month.
    pub month: NaiveDate,
    /// Short label for the chart axis, e.g. `Mar 2026`.
    pub label: String,
    pub revenue: Decimal,
    pub orders: i64,
}

/// First instant of the oldest month in a trailing window of `months`.
#[must_use]
pub fn series_start(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    let current = first_of_month(now.date_naive());
    let oldest = current
        .checked_sub_months(Months::new(months.saturating_sub(1)))
        .unwrap_or(current);
    start_of_day(oldest)
}

/// Build a gap-free monthly series, oldest month first.
///
/// `rows` holds `(month, revenue, orders)` aggregates as returned by a
/// `date_trunc('month', ...)` query; months absent from `rows` are zero.
#[must_use]
pub fn monthly_series(
    now: DateTime<Utc>,
    months: u32,
    rows: &[(NaiveDate, Decimal, i64)],
) -> Vec<MonthlyPoint> {
    let mut month = series_start(now, months).date_naive();
    let mut series = Vec::with_capacity(months as usize);

    for _ in 0..months {
        let (revenue, orders) = rows
            .iter()
            .find(|(m, _, _)| first_of_month(*m) == month)
            .map_or((Decimal::ZERO, 0), |(_, revenue, orders)| (*revenue, *orders));

        series.push(MonthlyPoint {
            month,
            label: month.format("%b %Y").to_string(),
            revenue,
            orders,
        });

        match month.checked_add_months(Months::new(1)) {
            Some(next) => month = next,
            None => break,
        }
    }

    series
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 15, 30, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_to_date_periods() {
        let periods = ReportingPeriods::month_to_date(at(2026, 3, 14));
        assert_eq!(periods.current_start, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(periods.previous_start, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(periods.previous_end(), periods.current_start);
        assert_eq!(periods.current_end, at(2026, 3, 14));
    }

    #[test]
    fn test_periods_cross_year_boundary() {
        let periods = ReportingPeriods::month_to_date(at(2026, 1, 2));
        assert_eq!(periods.previous_start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(Decimal::new(80, 0), Decimal::new(100, 0)), Decimal::new(-20, 0));
        assert_eq!(percent_change(Decimal::new(1, 0), Decimal::new(3, 0)), Decimal::new(-667, 1));
        assert_eq!(percent_change(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent_change(Decimal::ZERO, Decimal::new(10, 0)), Decimal::new(-100, 0));
    }

    #[test]
    fn test_metric_from_counts() {
        let metric = MetricComparison::from_counts(12, 8);
        assert_eq!(metric.current, Decimal::new(12, 0));
        assert_eq!(metric.change_percent, Decimal::new(50, 0));
    }

    #[test]
    fn test_average_order_value() {
        assert_eq!(average_order_value(Decimal::new(1000, 0), 3), Decimal::new(33333, 2));
        assert_eq!(average_order_value(Decimal::new(1000, 0), 0), Decimal::ZERO);
    }

    #[test]
    fn test_monthly_series_fills_gaps() {
        let rows = vec![
            (date(2025, 11, 1), Decimal::new(1200, 0), 3),
            (date(2026, 2, 1), Decimal::new(450, 0), 1),
        ];
        let series = monthly_series(at(2026, 2, 20), 4, &rows);

        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["Nov 2025", "Dec 2025", "Jan 2026", "Feb 2026"]);
        assert_eq!(series[0].revenue, Decimal::new(1200, 0));
        assert_eq!(series[1].orders, 0);
        assert_eq!(series[2].revenue, Decimal::ZERO);
        assert_eq!(series[3].orders, 1);
    }

    #[test]
    fn test_series_start() {
        assert_eq!(
            series_start(at(2026, 3, 31), REVENUE_SERIES_MONTHS),
            Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()
        );
    }
}
