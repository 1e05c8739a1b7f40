//! Review repository.

use sqlx::PgPool;

use luxora_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::Review;

const REVIEW_SELECT: &str = r"
    SELECT r.id, r.rating, r.comment, u.name AS author_name, r.created_at, r.updated_at
    FROM luxora.reviews r
    JOIN luxora.users u ON u.id = r.user_id
";

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews of a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_product(&self, product: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{REVIEW_SELECT} WHERE r.product_id = $1 ORDER BY r.created_at DESC, r.id DESC"
        ))
        .bind(product)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// Create or replace the user's review of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user: UserId,
        product: ProductId,
        rating: i16,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(
            r"
            WITH saved AS (
                INSERT INTO luxora.reviews (user_id, product_id, rating, comment)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, product_id)
                DO UPDATE SET rating = EXCLUDED.rating, comment = EXCLUDED.comment
                RETURNING id, user_id, rating, comment, created_at, updated_at
            )
            SELECT s.id, s.rating, s.comment, u.name AS author_name, s.created_at, s.updated_at
            FROM saved s
            JOIN luxora.users u ON u.id = s.user_id
            ",
        )
        .bind(user)
        .bind(product)
        .bind(rating)
        .bind(comment)
        .fetch_one(self.pool)
        .await?;

        Ok(review)
    }
}
