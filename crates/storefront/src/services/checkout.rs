//! Checkout: turns the visible lines of a cart into an order.
//!
//! Everything happens in one transaction. Product rows are locked with
//! `FOR UPDATE` before stock is checked, so concurrent checkouts of the last
//! unit serialize and stock never goes negative. Stock is checked against the
//! units of every variant line of a product together. Lines whose product or
//! merchant is no longer active are left in the cart.

use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;

use luxora_core::order::order_number;
use luxora_core::pricing::{CartTotals, PricedLine, StockError, ensure_in_stock, units_per_product};
use luxora_core::{CartItemId, OrderId, PaymentMethodId, PaymentStatus, UserId};

use crate::db::RepositoryError;
use crate::db::orders::{self, CheckoutLine, NewOrder};
use crate::models::Address;

/// Attempts at drawing an unused order number.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Errors from checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing purchasable in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// A line asks for more than is in stock.
    #[error("{product}: {source}")]
    Stock {
        product: String,
        #[source]
        source: StockError,
    },

    /// The payment method is not one of the user's.
    #[error("payment method not found")]
    PaymentMethodNotFound,

    /// Could not draw a free order number.
    #[error("could not allocate an order number")]
    OrderNumberExhausted,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub order_number: String,
    pub totals: CartTotals,
    /// Lines left in the cart because their product is unavailable.
    pub skipped_lines: usize,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for the user's cart.
    ///
    /// Uses the given payment method, or the user's default one when none is
    /// given. With a card on file the order is recorded as paid.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` when no line is purchasable,
    /// `CheckoutError::Stock` when a line exceeds stock and
    /// `CheckoutError::PaymentMethodNotFound` for a foreign card.
    #[tracing::instrument(skip(self, shipping_address), fields(user_id = %user))]
    pub async fn place_order(
        &self,
        user: UserId,
        shipping_address: &Address,
        payment_method: Option<PaymentMethodId>,
    ) -> Result<PlacedOrder, CheckoutError> {
        let mut tx = self.pool.begin().await?;

        let (lines, skipped): (Vec<CheckoutLine>, Vec<CheckoutLine>) =
            orders::lock_cart_lines(&mut *tx, user)
                .await?
                .into_iter()
                .partition(|line| line.available);
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        check_stock(&lines)?;

        let payment_method_id = match payment_method {
            Some(id) => {
                if !orders::owns_payment_method(&mut *tx, user, id).await? {
                    return Err(CheckoutError::PaymentMethodNotFound);
                }
                Some(id)
            }
            None => orders::default_payment_method(&mut *tx, user).await?,
        };
        let payment_status = if payment_method_id.is_some() {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        };

        let priced: Vec<PricedLine> = lines.iter().map(CheckoutLine::priced).collect();
        let totals = CartTotals::from_lines(&priced);

        let mut placed = None;
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            let number = order_number(rand::rng().random());
            let order = NewOrder {
                order_number: &number,
                user_id: user,
                payment_status,
                totals: &totals,
                shipping_address,
                payment_method_id,
            };
            if let Some(id) = orders::insert_order(&mut *tx, &order).await? {
                placed = Some((id, number));
                break;
            }
            tracing::warn!(order_number = %number, "order number collision, retrying");
        }
        let (id, number) = placed.ok_or(CheckoutError::OrderNumberExhausted)?;

        for line in &lines {
            orders::insert_item(&mut *tx, id, line).await?;
        }
        let purchased: Vec<CartItemId> = lines.iter().map(|l| l.cart_item_id).collect();
        orders::delete_cart_lines(&mut *tx, user, &purchased).await?;

        tx.commit().await?;

        tracing::info!(
            order_number = %number,
            total = %totals.total,
            items = totals.item_count,
            "order placed"
        );

        Ok(PlacedOrder {
            id,
            order_number: number,
            totals,
            skipped_lines: skipped.len(),
        })
    }
}

/// Every product must cover the units of all its lines.
fn check_stock(lines: &[CheckoutLine]) -> Result<(), CheckoutError> {
    let units = units_per_product(lines.iter().map(|l| (l.product_id, l.quantity)));
    for line in lines {
        let wanted = units.get(&line.product_id).copied().unwrap_or(line.quantity);
        ensure_in_stock(wanted, line.stock).map_err(|source| CheckoutError::Stock {
            product: line.product_name.clone(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use luxora_core::{MerchantId, ProductId};

    use super::*;

    fn line(cart_item: i32, product: i32, quantity: i32, color: &str) -> CheckoutLine {
        CheckoutLine {
            cart_item_id: CartItemId::new(cart_item),
            product_id: ProductId::new(product),
            merchant_id: MerchantId::new(1),
            product_name: format!("Product {product}"),
            unit_price: Decimal::new(4500, 2),
            discount_percent: 0,
            quantity,
            selected_color: Some(color.to_string()),
            selected_size: None,
            stock: 5,
            available: true,
        }
    }

    #[test]
    fn test_variants_share_product_stock() {
        let lines = [line(1, 1, 3, "Ivory"), line(2, 1, 3, "Noir")];
        let err = check_stock(&lines).err();
        assert!(matches!(
            err,
            Some(CheckoutError::Stock {
                source: StockError::Insufficient { available: 5 },
                ..
            })
        ));
    }

    #[test]
    fn test_variants_within_stock_pass() {
        let lines = [
            line(1, 1, 2, "Ivory"),
            line(2, 1, 3, "Noir"),
            line(3, 2, 5, "Ivory"),
        ];
        assert!(check_stock(&lines).is_ok());
    }

    #[test]
    fn test_discount_is_kept_per_line() {
        let mut discounted = line(1, 1, 2, "Ivory");
        discounted.discount_percent = 20;
        // 2 x 45.00 = 90.00, 20% off
        assert_eq!(discounted.priced().discount(), Decimal::new(1800, 2));
        assert_eq!(line(2, 2, 1, "Noir").priced().discount(), Decimal::ZERO);
    }
}
