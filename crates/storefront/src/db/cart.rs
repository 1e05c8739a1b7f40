//! Cart repository.
//!
//! Lines are unique per (user, product, color, size); adding the same
//! variant again updates the existing line. Concurrent updates to one line
//! are last-write-wins.

use rust_decimal::Decimal;
use sqlx::PgPool;

use luxora_core::{CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::CartLine;

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: CartItemId,
    product_id: ProductId,
    name: String,
    slug: String,
    images: Vec<String>,
    merchant_name: String,
    price: Decimal,
    discount_percent: i32,
    quantity: i32,
    selected_color: Option<String>,
    selected_size: Option<String>,
    stock: i32,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            name: row.name,
            slug: row.slug,
            image: row.images.into_iter().next(),
            merchant_name: row.merchant_name,
            unit_price: row.price,
            discount_percent: row.discount_percent,
            quantity: row.quantity,
            selected_color: row.selected_color,
            selected_size: row.selected_size,
            stock: row.stock,
            line_total: luxora_core::money::round_cents(row.price * Decimal::from(row.quantity)),
        }
    }
}

/// A cart line and the stock of its product.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct LineStock {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub stock: i32,
    /// Units of the same product held by the user's other lines.
    pub reserved: i32,
}

/// Units of a product already in a cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct InCart {
    /// On the line with the requested color and size.
    pub variant: i32,
    /// On every line of the product.
    pub product: i32,
}

/// Repository for cart lines.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Cart lines whose products are still on sale, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT ci.id, ci.product_id, p.name, p.slug, p.images, m.name AS merchant_name,
                   p.price, p.discount_percent, ci.quantity,
                   ci.selected_color, ci.selected_size, p.stock
            FROM luxora.cart_items ci
            JOIN luxora.products p ON p.id = ci.product_id
            JOIN luxora.merchants m ON m.id = p.merchant_id
            WHERE ci.user_id = $1
              AND p.status = 'ACTIVE' AND m.status = 'ACTIVE'
            ORDER BY ci.created_at ASC, ci.id ASC
            ",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    /// Units of a product already in the cart, on the given variant line and
    /// on all of its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn in_cart(
        &self,
        user: UserId,
        product: ProductId,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Result<InCart, RepositoryError> {
        let units = sqlx::query_as::<_, InCart>(
            r"
            SELECT
                COALESCE(SUM(quantity) FILTER (
                    WHERE COALESCE(selected_color, '') = COALESCE($3::text, '')
                      AND COALESCE(selected_size, '') = COALESCE($4::text, '')
                ), 0)::int AS variant,
                COALESCE(SUM(quantity), 0)::int AS product
            FROM luxora.cart_items
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user)
        .bind(product)
        .bind(color)
        .bind(size)
        .fetch_one(self.pool)
        .await?;

        Ok(units)
    }

    /// Insert a line or overwrite the quantity of the matching variant line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user: UserId,
        product: ProductId,
        quantity: i32,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Result<CartItemId, RepositoryError> {
        let id = sqlx::query_scalar::<_, CartItemId>(
            r"
            INSERT INTO luxora.cart_items (user_id, product_id, quantity, selected_color, selected_size)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, product_id, COALESCE(selected_color, ''), COALESCE(selected_size, ''))
            DO UPDATE SET quantity = EXCLUDED.quantity
            RETURNING id
            ",
        )
        .bind(user)
        .bind(product)
        .bind(quantity)
        .bind(color)
        .bind(size)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// A line of the user's cart with its product stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line_stock(
        &self,
        user: UserId,
        item: CartItemId,
    ) -> Result<Option<LineStock>, RepositoryError> {
        let line = sqlx::query_as::<_, LineStock>(
            r"
            SELECT ci.id, ci.product_id, ci.quantity, p.stock,
                   COALESCE((
                       SELECT SUM(other.quantity) FROM luxora.cart_items other
                       WHERE other.user_id = ci.user_id
                         AND other.product_id = ci.product_id
                         AND other.id <> ci.id
                   ), 0)::int AS reserved
            FROM luxora.cart_items ci
            JOIN luxora.products p ON p.id = ci.product_id
            WHERE ci.id = $1 AND ci.user_id = $2
            ",
        )
        .bind(item)
        .bind(user)
        .fetch_optional(self.pool)
        .await?;

        Ok(line)
    }

    /// Set the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in the user's cart.
    pub async fn set_quantity(
        &self,
        user: UserId,
        item: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE luxora.cart_items SET quantity = $3 WHERE id = $1 AND user_id = $2",
        )
        .bind(item)
        .bind(user)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in the user's cart.
    pub async fn remove(&self, user: UserId, item: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM luxora.cart_items WHERE id = $1 AND user_id = $2")
            .bind(item)
            .bind(user)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove every line of the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM luxora.cart_items WHERE user_id = $1")
            .bind(user)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
