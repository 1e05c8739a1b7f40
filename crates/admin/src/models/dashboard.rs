//! Dashboard payloads.

use rust_decimal::Decimal;
use serde::Serialize;

use luxora_core::ProductId;
use luxora_core::stats::MetricComparison;

/// Platform-wide month-to-date figures for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub revenue: MetricComparison,
    pub orders: MetricComparison,
    pub new_customers: MetricComparison,
    pub average_order_value: MetricComparison,
    pub active_merchants: i64,
    pub pending_merchants: i64,
    pub active_products: i64,
}

/// Month-to-date figures for one merchant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantStats {
    pub revenue: MetricComparison,
    pub orders: MetricComparison,
    pub units_sold: MetricComparison,
    pub average_order_value: MetricComparison,
    pub active_products: i64,
    /// Products at or below the merchant's low-stock threshold.
    pub low_stock_products: i64,
}

/// Best seller of the current period.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub merchant_name: String,
    pub units_sold: i64,
    pub revenue: Decimal,
}
