//! Dashboard aggregation queries.
//!
//! Queries only sum and count. Period boundaries, percentage change, gap
//! filling and feed merging come from `luxora_core::stats` and
//! `luxora_core::activity`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use luxora_core::activity::{ActivityItem, ActivityKind, merge_activity, window_start};
use luxora_core::money::format_usd;
use luxora_core::stats::{
    MetricComparison, MonthlyPoint, ReportingPeriods, average_order_value, monthly_series,
    series_start,
};
use luxora_core::{MerchantId, OrderId, ProductId, ReviewId};

use super::RepositoryError;
use crate::models::{MerchantStats, PlatformStats, TopProduct};

/// Whose numbers a dashboard query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every merchant (admin dashboard).
    Platform,
    /// One merchant's products and order lines.
    Merchant(MerchantId),
}

impl Scope {
    const fn merchant(self) -> Option<MerchantId> {
        match self {
            Self::Platform => None,
            Self::Merchant(id) => Some(id),
        }
    }
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct PeriodTotals {
    current_revenue: Decimal,
    current_orders: i64,
    current_units: i64,
    previous_revenue: Decimal,
    previous_orders: i64,
    previous_units: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderActivityRow {
    id: OrderId,
    order_number: String,
    customer_name: String,
    amount: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductActivityRow {
    id: ProductId,
    name: String,
    merchant_name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewActivityRow {
    id: ReviewId,
    rating: i16,
    author_name: String,
    product_name: String,
    created_at: DateTime<Utc>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for dashboard statistics.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    /// Create a new dashboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Platform figures for the month to date against the previous month.
    ///
    /// Revenue and order counts exclude cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn platform_stats(
        &self,
        now: DateTime<Utc>,
    ) -> Result<PlatformStats, RepositoryError> {
        let periods = ReportingPeriods::month_to_date(now);

        let totals = sqlx::query_as::<_, PeriodTotals>(
            r"
            SELECT
                COALESCE(SUM(o.total) FILTER (WHERE o.created_at >= $1), 0) AS current_revenue,
                COUNT(*) FILTER (WHERE o.created_at >= $1) AS current_orders,
                0::bigint AS current_units,
                COALESCE(SUM(o.total) FILTER (WHERE o.created_at < $1), 0) AS previous_revenue,
                COUNT(*) FILTER (WHERE o.created_at < $1) AS previous_orders,
                0::bigint AS previous_units
            FROM luxora.orders o
            WHERE o.status <> 'CANCELLED'
              AND o.created_at >= $3
              AND o.created_at <= $2
            ",
        )
        .bind(periods.current_start)
        .bind(periods.current_end)
        .bind(periods.previous_start)
        .fetch_one(self.pool)
        .await?;

        let (current_customers, previous_customers): (i64, i64) = sqlx::query_as(
            r"
            SELECT
                COUNT(*) FILTER (WHERE created_at >= $1),
                COUNT(*) FILTER (WHERE created_at < $1)
            FROM luxora.users
            WHERE role = 'CUSTOMER'
              AND created_at >= $3
              AND created_at <= $2
            ",
        )
        .bind(periods.current_start)
        .bind(periods.current_end)
        .bind(periods.previous_start)
        .fetch_one(self.pool)
        .await?;

        let (active_merchants, pending_merchants, active_products): (i64, i64, i64) =
            sqlx::query_as(
                r"
                SELECT
                    (SELECT COUNT(*) FROM luxora.merchants WHERE status = 'ACTIVE'),
                    (SELECT COUNT(*) FROM luxora.merchants WHERE status = 'PENDING'),
                    (SELECT COUNT(*) FROM luxora.products WHERE status = 'ACTIVE')
                ",
            )
            .fetch_one(self.pool)
            .await?;

        Ok(PlatformStats {
            revenue: MetricComparison::new(totals.current_revenue, totals.previous_revenue),
            orders: MetricComparison::from_counts(totals.current_orders, totals.previous_orders),
            new_customers: MetricComparison::from_counts(current_customers, previous_customers),
            average_order_value: MetricComparison::new(
                average_order_value(totals.current_revenue, totals.current_orders),
                average_order_value(totals.previous_revenue, totals.previous_orders),
            ),
            active_merchants,
            pending_merchants,
            active_products,
        })
    }

    /// One merchant's figures for the month to date against the previous
    /// month. Revenue is the sum of the merchant's own order lines after
    /// their product discounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn merchant_stats(
        &self,
        merchant: MerchantId,
        now: DateTime<Utc>,
    ) -> Result<MerchantStats, RepositoryError> {
        let periods = ReportingPeriods::month_to_date(now);

        let totals = sqlx::query_as::<_, PeriodTotals>(
            r"
            SELECT
                COALESCE(SUM(oi.unit_price * oi.quantity - oi.line_discount)
                         FILTER (WHERE o.created_at >= $1), 0)
                    AS current_revenue,
                COUNT(DISTINCT o.id) FILTER (WHERE o.created_at >= $1) AS current_orders,
                COALESCE(SUM(oi.quantity) FILTER (WHERE o.created_at >= $1), 0)::bigint
                    AS current_units,
                COALESCE(SUM(oi.unit_price * oi.quantity - oi.line_discount)
                         FILTER (WHERE o.created_at < $1), 0)
                    AS previous_revenue,
                COUNT(DISTINCT o.id) FILTER (WHERE o.created_at < $1) AS previous_orders,
                COALESCE(SUM(oi.quantity) FILTER (WHERE o.created_at < $1), 0)::bigint
                    AS previous_units
            FROM luxora.order_items oi
            JOIN luxora.orders o ON o.id = oi.order_id
            WHERE oi.merchant_id = $4
              AND o.status <> 'CANCELLED'
              AND o.created_at >= $3
              AND o.created_at <= $2
            ",
        )
        .bind(periods.current_start)
        .bind(periods.current_end)
        .bind(periods.previous_start)
        .bind(merchant)
        .fetch_one(self.pool)
        .await?;

        let (active_products, low_stock_products): (i64, i64) = sqlx::query_as(
            r"
            SELECT
                COUNT(*) FILTER (WHERE p.status = 'ACTIVE'),
                COUNT(*) FILTER (WHERE p.status = 'ACTIVE' AND p.stock <= m.low_stock_threshold)
            FROM luxora.products p
            JOIN luxora.merchants m ON m.id = p.merchant_id
            WHERE p.merchant_id = $1
            ",
        )
        .bind(merchant)
        .fetch_one(self.pool)
        .await?;

        Ok(MerchantStats {
            revenue: MetricComparison::new(totals.current_revenue, totals.previous_revenue),
            orders: MetricComparison::from_counts(totals.current_orders, totals.previous_orders),
            units_sold: MetricComparison::from_counts(totals.current_units, totals.previous_units),
            average_order_value: MetricComparison::new(
                average_order_value(totals.current_revenue, totals.current_orders),
                average_order_value(totals.previous_revenue, totals.previous_orders),
            ),
            active_products,
            low_stock_products,
        })
    }

    /// Monthly revenue for the trailing `months`, oldest first, gap-free.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revenue_series(
        &self,
        scope: Scope,
        now: DateTime<Utc>,
        months: u32,
    ) -> Result<Vec<MonthlyPoint>, RepositoryError> {
        let since = series_start(now, months);

        let rows: Vec<(NaiveDate, Decimal, i64)> = match scope {
            Scope::Platform => {
                sqlx::query_as(
                    r"
                    SELECT date_trunc('month', o.created_at AT TIME ZONE 'UTC')::date AS month,
                           COALESCE(SUM(o.total), 0) AS revenue,
                           COUNT(*) AS orders
                    FROM luxora.orders o
                    WHERE o.status <> 'CANCELLED' AND o.created_at >= $1
                    GROUP BY 1
                    ORDER BY 1
                    ",
                )
                .bind(since)
                .fetch_all(self.pool)
                .await?
            }
            Scope::Merchant(merchant) => {
                sqlx::query_as(
                    r"
                    SELECT date_trunc('month', o.created_at AT TIME ZONE 'UTC')::date AS month,
                           COALESCE(SUM(oi.unit_price * oi.quantity - oi.line_discount), 0) AS revenue,
                           COUNT(DISTINCT o.id) AS orders
                    FROM luxora.order_items oi
                    JOIN luxora.orders o ON o.id = oi.order_id
                    WHERE oi.merchant_id = $2
                      AND o.status <> 'CANCELLED'
                      AND o.created_at >= $1
                    GROUP BY 1
                    ORDER BY 1
                    ",
                )
                .bind(since)
                .bind(merchant)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(monthly_series(now, months, &rows))
    }

    /// Recent orders, new products and reviews, newest first.
    ///
    /// The three sources are loaded concurrently, each capped at `limit`,
    /// then merged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn activity(
        &self,
        scope: Scope,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ActivityItem>, RepositoryError> {
        let since = window_start(now);
        let fetch = i64::try_from(limit).unwrap_or(i64::MAX);

        let (orders, products, reviews) = tokio::try_join!(
            self.order_activity(scope, since, fetch),
            self.product_activity(scope, since, fetch),
            self.review_activity(scope, since, fetch),
        )?;

        Ok(merge_activity([orders, products, reviews], limit))
    }

    async fn order_activity(
        &self,
        scope: Scope,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ActivityItem>, RepositoryError> {
        // Merchants see the value of their own lines, not the whole order
        let rows = sqlx::query_as::<_, OrderActivityRow>(
            r"
            SELECT o.id, o.order_number, u.name AS customer_name,
                   CASE WHEN $2::int IS NULL THEN o.total
                        ELSE (SELECT COALESCE(SUM(oi.unit_price * oi.quantity - oi.line_discount), 0)
                              FROM luxora.order_items oi
                              WHERE oi.order_id = o.id AND oi.merchant_id = $2)
                   END AS amount,
                   o.created_at
            FROM luxora.orders o
            JOIN luxora.users u ON u.id = o.user_id
            WHERE o.created_at >= $1
              AND ($2::int IS NULL OR EXISTS (
                    SELECT 1 FROM luxora.order_items oi
                    WHERE oi.order_id = o.id AND oi.merchant_id = $2))
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $3
            ",
        )
        .bind(since)
        .bind(scope.merchant())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ActivityItem {
                kind: ActivityKind::Order,
                id: row.id.as_i32(),
                title: format!("New order {}", row.order_number),
                description: format!("{} spent {}", row.customer_name, format_usd(row.amount)),
                timestamp: row.created_at,
            })
            .collect())
    }

    async fn product_activity(
        &self,
        scope: Scope,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ActivityItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductActivityRow>(
            r"
            SELECT p.id, p.name, m.name AS merchant_name, p.created_at
            FROM luxora.products p
            JOIN luxora.merchants m ON m.id = p.merchant_id
            WHERE p.created_at >= $1
              AND ($2::int IS NULL OR p.merchant_id = $2)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3
            ",
        )
        .bind(since)
        .bind(scope.merchant())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ActivityItem {
                kind: ActivityKind::Product,
                id: row.id.as_i32(),
                title: "New product listed".to_string(),
                description: format!("{} by {}", row.name, row.merchant_name),
                timestamp: row.created_at,
            })
            .collect())
    }

    async fn review_activity(
        &self,
        scope: Scope,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ActivityItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewActivityRow>(
            r"
            SELECT r.id, r.rating, u.name AS author_name, p.name AS product_name, r.created_at
            FROM luxora.reviews r
            JOIN luxora.users u ON u.id = r.user_id
            JOIN luxora.products p ON p.id = r.product_id
            WHERE r.created_at >= $1
              AND ($2::int IS NULL OR p.merchant_id = $2)
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $3
            ",
        )
        .bind(since)
        .bind(scope.merchant())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ActivityItem {
                kind: ActivityKind::Review,
                id: row.id.as_i32(),
                title: format!("New {}-star review", row.rating),
                description: format!("{} reviewed {}", row.author_name, row.product_name),
                timestamp: row.created_at,
            })
            .collect())
    }

    /// Best sellers by units over the current month to date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_products(
        &self,
        scope: Scope,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TopProduct>, RepositoryError> {
        let periods = ReportingPeriods::month_to_date(now);

        let products = sqlx::query_as::<_, TopProduct>(
            r"
            SELECT p.id, p.name, p.slug, m.name AS merchant_name,
                   SUM(oi.quantity)::bigint AS units_sold,
                   SUM(oi.unit_price * oi.quantity - oi.line_discount) AS revenue
            FROM luxora.order_items oi
            JOIN luxora.orders o ON o.id = oi.order_id
            JOIN luxora.products p ON p.id = oi.product_id
            JOIN luxora.merchants m ON m.id = p.merchant_id
            WHERE o.status <> 'CANCELLED'
              AND o.created_at >= $1
              AND o.created_at <= $2
              AND ($3::int IS NULL OR oi.merchant_id = $3)
            GROUP BY p.id, p.name, p.slug, m.name
            ORDER BY units_sold DESC, revenue DESC, p.id
            LIMIT $4
            ",
        )
        .bind(periods.current_start)
        .bind(periods.current_end)
        .bind(scope.merchant())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_merchant() {
        assert_eq!(Scope::Platform.merchant(), None);
        assert_eq!(
            Scope::Merchant(MerchantId::new(4)).merchant(),
            Some(MerchantId::new(4))
        );
    }
}
