//! Order history types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use luxora_core::order::TimelineStep;
use luxora_core::{MerchantId, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId};

use super::Address;

/// Row of the order history list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total: Decimal,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A purchased line, attributed to the merchant that sold it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_slug: String,
    pub image: Option<String>,
    pub merchant_id: MerchantId,
    pub merchant_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_discount: Decimal,
    pub selected_color: Option<String>,
    pub selected_size: Option<String>,
}

/// Order page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub shipping_address: Address,
    pub items: Vec<OrderLine>,
    pub timeline: Vec<TimelineStep>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
