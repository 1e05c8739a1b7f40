//! Order management types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use luxora_core::money::round_cents;
use luxora_core::order::TimelineStep;
use luxora_core::{MerchantId, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, UserId};

/// Row of the admin order list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total: Decimal,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// An order line with its merchant.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub merchant_id: MerchantId,
    pub merchant_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    /// Product discount taken off this line at checkout.
    pub line_discount: Decimal,
    pub selected_color: Option<String>,
    pub selected_size: Option<String>,
}

impl OrderItem {
    /// What the line was sold for: `unit_price * quantity - line_discount`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        round_cents(self.unit_price * Decimal::from(self.quantity) - self.line_discount)
    }
}

/// Order detail page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: OrderId,
    pub order_number: String,
    pub customer_id: UserId,
    pub customer_name: String,
    pub customer_email: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    /// Stored as entered at checkout.
    pub shipping_address: serde_json::Value,
    pub items: Vec<OrderItem>,
    pub timeline: Vec<TimelineStep>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order as a merchant sees it: only the lines that merchant sold.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantOrder {
    pub id: OrderId,
    pub order_number: String,
    pub customer_name: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub items: Vec<OrderItem>,
    /// Sum of this merchant's lines after product discounts.
    pub merchant_total: Decimal,
    pub created_at: DateTime<Utc>,
}
