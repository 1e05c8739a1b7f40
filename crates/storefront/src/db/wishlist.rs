//! Wishlist repository.

use sqlx::PgPool;

use luxora_core::{ProductId, UserId};

use super::RepositoryError;

/// Repository for wishlist entries.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add the product if absent, remove it if present.
    ///
    /// Returns whether the product is on the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn toggle(&self, user: UserId, product: ProductId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            "DELETE FROM luxora.wishlist_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user)
        .bind(product)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            sqlx::query(
                r"
                INSERT INTO luxora.wishlist_items (user_id, product_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, product_id) DO NOTHING
                ",
            )
            .bind(user)
            .bind(product)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(removed == 0)
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product was not wishlisted.
    pub async fn remove(&self, user: UserId, product: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM luxora.wishlist_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user)
        .bind(product)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
