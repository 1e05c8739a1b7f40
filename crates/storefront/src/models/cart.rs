//! Cart types.

use rust_decimal::Decimal;
use serde::Serialize;

use luxora_core::pricing::{CartTotals, PricedLine};
use luxora_core::{CartItemId, ProductId};

/// One line of the cart with the product data needed to render it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub merchant_name: String,
    pub unit_price: Decimal,
    pub discount_percent: i32,
    pub quantity: i32,
    pub selected_color: Option<String>,
    pub selected_size: Option<String>,
    /// Units currently in stock.
    pub stock: i32,
    /// `unit_price * quantity`.
    pub line_total: Decimal,
}

impl CartLine {
    /// Pricing view of this line.
    #[must_use]
    pub const fn priced(&self) -> PricedLine {
        PricedLine::new(self.unit_price, self.quantity, self.discount_percent)
    }
}

/// Cart page: lines plus totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub totals: CartTotals,
    /// Amount left to spend for free shipping.
    pub free_shipping_remaining: Decimal,
}

impl CartView {
    /// Price a set of lines.
    #[must_use]
    pub fn new(items: Vec<CartLine>) -> Self {
        let priced: Vec<PricedLine> = items.iter().map(CartLine::priced).collect();
        let totals = CartTotals::from_lines(&priced);
        Self {
            free_shipping_remaining: totals.remaining_for_free_shipping(),
            items,
            totals,
        }
    }
}
