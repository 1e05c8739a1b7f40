//! Cart operations on top of the cart repository.

use sqlx::PgPool;
use thiserror::Error;

use luxora_core::pricing::{MAX_LINE_QUANTITY, StockError, clamp_quantity, ensure_in_stock, fit_to_stock};
use luxora_core::{CartItemId, ProductId, UserId};

use crate::db::cart::InCart;
use crate::db::products::PurchasableProduct;
use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::models::CartView;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product does not exist or is not for sale.
    #[error("product not available")]
    ProductUnavailable,

    /// A selected color or size is not offered by the product.
    #[error("invalid {0} selection")]
    InvalidOption(&'static str),

    /// Not enough stock.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// The line is not in the user's cart.
    #[error("cart item not found")]
    LineNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Variant choice for a cart line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Variant<'a> {
    pub color: Option<&'a str>,
    pub size: Option<&'a str>,
}

impl<'a> Variant<'a> {
    /// Normalize blank selections to `None`.
    #[must_use]
    pub fn new(color: Option<&'a str>, size: Option<&'a str>) -> Self {
        let clean = |v: Option<&'a str>| v.map(str::trim).filter(|s| !s.is_empty());
        Self {
            color: clean(color),
            size: clean(size),
        }
    }

    /// Match the selection against what the product offers, ignoring case.
    /// The returned variant spells each option the way the product does, so
    /// `noir` and `Noir` land on the same cart line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidOption` naming the offending option.
    pub fn resolve<'p>(
        &self,
        product: &'p PurchasableProduct,
    ) -> Result<Variant<'p>, CartError> {
        let color =
            offered(&product.colors, self.color).ok_or(CartError::InvalidOption("color"))?;
        let size = offered(&product.sizes, self.size).ok_or(CartError::InvalidOption("size"))?;
        Ok(Variant { color, size })
    }
}

/// `None` when the choice is not offered; `Some(None)` when nothing was chosen.
fn offered<'p>(options: &'p [String], choice: Option<&str>) -> Option<Option<&'p str>> {
    match choice {
        None => Some(None),
        Some(c) => options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(c))
            .map(|o| Some(o.as_str())),
    }
}

/// Units of the product in the cart once the variant line holds `merged`.
const fn units_after_merge(in_cart: InCart, merged: i32) -> i32 {
    in_cart
        .product
        .saturating_sub(in_cart.variant)
        .saturating_add(merged)
}

/// Cart service.
pub struct CartService<'a> {
    cart: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            cart: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// The user's cart with totals.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn view(&self, user: UserId) -> Result<CartView, CartError> {
        Ok(CartView::new(self.cart.lines(user).await?))
    }

    /// Add units of a product, merging into an existing line with the same
    /// color and size. Stock must cover every line of the product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductUnavailable` for unknown or hidden products,
    /// `CartError::InvalidOption` for unknown variants and `CartError::Stock`
    /// when the product's lines together exceed stock.
    pub async fn add(
        &self,
        user: UserId,
        product: ProductId,
        quantity: i32,
        variant: Variant<'_>,
    ) -> Result<CartItemId, CartError> {
        let product = self
            .products
            .purchasable(product)
            .await?
            .ok_or(CartError::ProductUnavailable)?;
        let variant = variant.resolve(&product)?;

        let in_cart = self
            .cart
            .in_cart(user, product.id, variant.color, variant.size)
            .await?;
        let merged = in_cart
            .variant
            .saturating_add(clamp_quantity(quantity))
            .min(MAX_LINE_QUANTITY);
        ensure_in_stock(units_after_merge(in_cart, merged), product.stock)?;

        let id = self
            .cart
            .upsert(user, product.id, merged, variant.color, variant.size)
            .await?;

        tracing::debug!(user_id = %user, product_id = %product.id, quantity = merged, "cart line saved");
        Ok(id)
    }

    /// Set a line's quantity, clamped to at least one and at most the stock
    /// left over by the product's other lines. Returns the quantity actually
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the line is not the user's and
    /// `CartError::Stock` if the product sold out.
    pub async fn update(
        &self,
        user: UserId,
        item: CartItemId,
        quantity: i32,
    ) -> Result<i32, CartError> {
        let line = self
            .cart
            .line_stock(user, item)
            .await?
            .ok_or(CartError::LineNotFound)?;

        let quantity = fit_to_stock(quantity, line.stock.saturating_sub(line.reserved))?;
        self.cart
            .set_quantity(user, line.id, quantity)
            .await
            .map_err(not_found_as_line)?;

        Ok(quantity)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the line is not the user's.
    pub async fn remove(&self, user: UserId, item: CartItemId) -> Result<(), CartError> {
        self.cart.remove(user, item).await.map_err(not_found_as_line)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn clear(&self, user: UserId) -> Result<(), CartError> {
        let removed = self.cart.clear(user).await?;
        tracing::debug!(user_id = %user, removed, "cart cleared");
        Ok(())
    }
}

fn not_found_as_line(err: RepositoryError) -> CartError {
    match err {
        RepositoryError::NotFound => CartError::LineNotFound,
        other => CartError::Repository(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product() -> PurchasableProduct {
        PurchasableProduct {
            id: ProductId::new(1),
            name: "Silk Scarf".to_string(),
            stock: 5,
            sizes: vec![],
            colors: vec!["Ivory".to_string(), "Noir".to_string()],
        }
    }

    #[test]
    fn test_variant_blank_is_none() {
        let v = Variant::new(Some("  "), Some(""));
        assert!(v.color.is_none());
        assert!(v.size.is_none());
    }

    #[test]
    fn test_variant_resolve() {
        let p = product();
        assert!(Variant::default().resolve(&p).is_ok());
        assert!(matches!(
            Variant::new(Some("Red"), None).resolve(&p),
            Err(CartError::InvalidOption("color"))
        ));
        assert!(matches!(
            Variant::new(None, Some("M")).resolve(&p),
            Err(CartError::InvalidOption("size"))
        ));
    }

    #[test]
    fn test_variant_uses_product_spelling() {
        let p = product();
        let lower = Variant::new(Some("noir"), None).resolve(&p).unwrap();
        let upper = Variant::new(Some(" NOIR "), None).resolve(&p).unwrap();
        assert_eq!(lower.color, Some("Noir"));
        assert_eq!(upper.color, lower.color);
        assert!(lower.size.is_none());
    }

    #[test]
    fn test_units_after_merge_counts_other_variants() {
        // 3 Ivory already in the cart, adding 3 Noir.
        let in_cart = InCart {
            variant: 0,
            product: 3,
        };
        assert_eq!(units_after_merge(in_cart, 3), 6);
        assert!(ensure_in_stock(units_after_merge(in_cart, 3), 5).is_err());

        // Topping up the Ivory line itself replaces its old quantity.
        let in_cart = InCart {
            variant: 3,
            product: 3,
        };
        assert_eq!(units_after_merge(in_cart, 4), 4);
    }
}
