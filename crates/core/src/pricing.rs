//! Cart and order pricing.
//!
//! The same arithmetic prices the cart page, the checkout summary and the
//! stored order, so the numbers a shopper sees are the numbers they pay:
//!
//! - `subtotal` is the sum of `unit_price * quantity`
//! - `discount` is the sum of each line's `discount_percent` of its subtotal
//! - `tax` is 8% of `subtotal`
//! - `shipping` is free over $500 (and for an empty cart), $25 otherwise
//! - `total = subtotal - discount + tax + shipping`
//!
//! All amounts are rounded to cents and carry two decimal places.

use std::collections::HashMap;
use std::hash::Hash;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{CENT_SCALE, percent_of, round_cents};

/// Sales tax charged on the subtotal, in percent.
pub const TAX_RATE_PERCENT: u32 = 8;

/// Largest per-product discount a merchant may configure, in percent.
pub const MAX_DISCOUNT_PERCENT: i32 = 90;

/// Largest quantity of a single cart line. Stock still applies below it.
pub const MAX_LINE_QUANTITY: i32 = 99;

/// Subtotal above which shipping is free.
#[must_use]
pub fn free_shipping_threshold() -> Decimal {
    Decimal::new(50_000, CENT_SCALE)
}

/// Flat shipping charge below the free-shipping threshold.
#[must_use]
pub fn flat_shipping_rate() -> Decimal {
    Decimal::new(2_500, CENT_SCALE)
}

fn zero_cents() -> Decimal {
    Decimal::new(0, CENT_SCALE)
}

/// Errors raised when fitting a quantity to available stock.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StockError {
    /// Nothing left to sell.
    #[error("out of stock")]
    OutOfStock,
    /// The request exceeds what is left.
    #[error("only {available} left in stock")]
    Insufficient {
        /// Units available.
        available: i32,
    },
}

/// Clamp a requested line quantity into `1..=MAX_LINE_QUANTITY`.
///
/// Zero and negative quantities become 1; removing a line is a separate
/// operation.
#[must_use]
pub const fn clamp_quantity(requested: i32) -> i32 {
    if requested < 1 {
        1
    } else if requested > MAX_LINE_QUANTITY {
        MAX_LINE_QUANTITY
    } else {
        requested
    }
}

/// Clamp a requested quantity, then cap it at the units in stock.
///
/// # Errors
///
/// Returns [`StockError::OutOfStock`] when `stock` is zero or negative.
pub fn fit_to_stock(requested: i32, stock: i32) -> Result<i32, StockError> {
    if stock <= 0 {
        return Err(StockError::OutOfStock);
    }
    Ok(clamp_quantity(requested).min(stock))
}

/// Check that an exact quantity can be fulfilled.
///
/// # Errors
///
/// Returns a [`StockError`] when `stock` cannot cover `quantity`.
pub const fn ensure_in_stock(quantity: i32, stock: i32) -> Result<(), StockError> {
    if stock <= 0 {
        Err(StockError::OutOfStock)
    } else if quantity > stock {
        Err(StockError::Insufficient { available: stock })
    } else {
        Ok(())
    }
}

/// Units asked for per key, usually a product, summed over all lines.
///
/// Color and size variants of one product share its stock, so stock is
/// checked against these sums rather than line by line.
#[must_use]
pub fn units_per_product<K, I>(lines: I) -> HashMap<K, i32>
where
    K: Eq + Hash,
    I: IntoIterator<Item = (K, i32)>,
{
    let mut units = HashMap::new();
    for (key, quantity) in lines {
        let total: &mut i32 = units.entry(key).or_insert(0);
        *total = total.saturating_add(quantity.max(0));
    }
    units
}

/// Price after a product's percentage discount.
#[must_use]
pub fn sale_price(price: Decimal, discount_percent: i32) -> Decimal {
    let pct = u32::try_from(discount_percent.clamp(0, MAX_DISCOUNT_PERCENT)).unwrap_or(0);
    round_cents(price - percent_of(price, pct))
}

/// One priced cart or order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    /// List price of one unit.
    pub unit_price: Decimal,
    /// Units on the line.
    pub quantity: i32,
    /// Product discount in percent.
    pub discount_percent: i32,
}

impl PricedLine {
    /// Create a priced line.
    #[must_use]
    pub const fn new(unit_price: Decimal, quantity: i32, discount_percent: i32) -> Self {
        Self {
            unit_price,
            quantity,
            discount_percent,
        }
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        round_cents(self.unit_price * Decimal::from(self.quantity.max(0)))
    }

    /// Discount on this line.
    #[must_use]
    pub fn discount(&self) -> Decimal {
        let pct = u32::try_from(self.discount_percent.clamp(0, MAX_DISCOUNT_PERCENT)).unwrap_or(0);
        percent_of(self.subtotal(), pct)
    }
}

/// Totals shown on the cart page and stored on orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of quantities.
    pub item_count: i32,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Totals of an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            item_count: 0,
            subtotal: zero_cents(),
            discount: zero_cents(),
            tax: zero_cents(),
            shipping: zero_cents(),
            total: zero_cents(),
        }
    }

    /// Price a set of lines.
    #[must_use]
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a PricedLine>,
    {
        let mut item_count = 0_i32;
        let mut subtotal = zero_cents();
        let mut discount = zero_cents();

        for line in lines {
            item_count = item_count.saturating_add(line.quantity.max(0));
            subtotal += line.subtotal();
            discount += line.discount();
        }

        if item_count == 0 {
            return Self::empty();
        }

        let tax = percent_of(subtotal, TAX_RATE_PERCENT);
        let shipping = shipping_for(subtotal);
        let total = round_cents(subtotal - discount + tax + shipping);

        Self {
            item_count,
            subtotal,
            discount,
            tax,
            shipping,
            total,
        }
    }

    /// How much more must be spent to unlock free shipping.
    #[must_use]
    pub fn remaining_for_free_shipping(&self) -> Decimal {
        if self.item_count == 0 || self.subtotal > free_shipping_threshold() {
            zero_cents()
        } else {
            // Strictly "over" the threshold, so one more cent is needed.
            free_shipping_threshold() - self.subtotal + Decimal::new(1, 2)
        }
    }
}

/// Shipping charge for a non-empty cart with the given subtotal.
#[must_use]
pub fn shipping_for(subtotal: Decimal) -> Decimal {
    if subtotal > free_shipping_threshold() {
        zero_cents()
    } else {
        flat_shipping_rate()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn dollars(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(-3), 1);
        assert_eq!(clamp_quantity(0), 1);
        assert_eq!(clamp_quantity(4), 4);
        assert_eq!(clamp_quantity(1000), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_fit_to_stock() {
        assert_eq!(fit_to_stock(0, 10), Ok(1));
        assert_eq!(fit_to_stock(12, 5), Ok(5));
        assert_eq!(fit_to_stock(2, 0), Err(StockError::OutOfStock));
    }

    #[test]
    fn test_ensure_in_stock() {
        assert_eq!(ensure_in_stock(3, 3), Ok(()));
        assert_eq!(
            ensure_in_stock(4, 3),
            Err(StockError::Insufficient { available: 3 })
        );
        assert_eq!(ensure_in_stock(1, 0), Err(StockError::OutOfStock));
    }

    #[test]
    fn test_empty_cart_is_free() {
        let totals = CartTotals::from_lines(&[]);
        assert_eq!(totals, CartTotals::empty());
        assert_eq!(totals.remaining_for_free_shipping(), Decimal::ZERO);
    }

    #[test]
    fn test_small_cart_pays_flat_shipping() {
        let lines = [PricedLine::new(dollars(120), 2, 0)];
        let totals = CartTotals::from_lines(&lines);

        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.subtotal, dollars(240));
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::new(1920, 2));
        assert_eq!(totals.shipping, dollars(25));
        assert_eq!(totals.total, Decimal::new(28420, 2));
        assert_eq!(totals.remaining_for_free_shipping(), Decimal::new(26001, 2));
    }

    #[test]
    fn test_shipping_threshold_is_strict() {
        let at_threshold = CartTotals::from_lines(&[PricedLine::new(dollars(500), 1, 0)]);
        assert_eq!(at_threshold.shipping, dollars(25));

        let over = CartTotals::from_lines(&[PricedLine::new(Decimal::new(50001, 2), 1, 0)]);
        assert_eq!(over.shipping, Decimal::ZERO);
    }

    #[test]
    fn test_discount_and_tax_on_list_subtotal() {
        let lines = [
            PricedLine::new(dollars(450), 1, 20),
            PricedLine::new(Decimal::new(8999, 2), 2, 0),
        ];
        let totals = CartTotals::from_lines(&lines);

        // 450 + 179.98
        assert_eq!(totals.subtotal, Decimal::new(62998, 2));
        assert_eq!(totals.discount, dollars(90));
        // 8% of 629.98 = 50.3984
        assert_eq!(totals.tax, Decimal::new(5040, 2));
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::new(59038, 2));
    }

    #[test]
    fn test_amounts_serialize_with_cents() {
        let small = CartTotals::from_lines(&[PricedLine::new(dollars(200), 1, 0)]);
        let json = serde_json::to_value(small).unwrap();
        assert_eq!(json["subtotal"], "200.00");
        assert_eq!(json["discount"], "0.00");
        assert_eq!(json["tax"], "16.00");
        assert_eq!(json["shipping"], "25.00");
        assert_eq!(json["total"], "241.00");

        let large = CartTotals::from_lines(&[PricedLine::new(dollars(600), 1, 10)]);
        let json = serde_json::to_value(large).unwrap();
        assert_eq!(json["shipping"], "0.00");
        assert_eq!(json["discount"], "60.00");

        let json = serde_json::to_value(CartTotals::empty()).unwrap();
        assert_eq!(json["total"], "0.00");
    }

    #[test]
    fn test_units_per_product_sums_variants() {
        let units = units_per_product([(7, 3), (9, 1), (7, 3), (7, -2)]);
        assert_eq!(units.get(&7), Some(&6));
        assert_eq!(units.get(&9), Some(&1));
        assert_eq!(units.len(), 2);
    }

    #[test]
    fn test_variant_lines_exceed_shared_stock() {
        // Each line fits on its own; together they do not.
        let units = units_per_product([(1, 3), (1, 3)]);
        assert_eq!(ensure_in_stock(3, 5), Ok(()));
        assert_eq!(
            ensure_in_stock(units[&1], 5),
            Err(StockError::Insufficient { available: 5 })
        );
    }

    #[test]
    fn test_sale_price_caps_discount() {
        assert_eq!(sale_price(dollars(200), 25), dollars(150));
        assert_eq!(sale_price(dollars(100), 150), dollars(10));
        assert_eq!(sale_price(dollars(100), -5), dollars(100));
    }
}
