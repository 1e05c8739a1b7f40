//! Collection repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::CollectionSummary;

const COLLECTION_SELECT: &str = r"
    SELECT c.id, c.name, c.slug, c.description, c.season, c.image_url,
           (
               SELECT COUNT(*)
               FROM luxora.collection_products cp
               JOIN luxora.products p ON p.id = cp.product_id
               JOIN luxora.merchants m ON m.id = p.merchant_id
               WHERE cp.collection_id = c.id
                 AND p.status = 'ACTIVE' AND m.status = 'ACTIVE'
           ) AS product_count
    FROM luxora.collections c
    WHERE c.is_active
";

/// Repository for curated collections.
pub struct CollectionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CollectionRepository<'a> {
    /// Create a new collection repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active collections in display order, optionally for one season.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(
        &self,
        season: Option<&str>,
    ) -> Result<Vec<CollectionSummary>, RepositoryError> {
        let collections = sqlx::query_as::<_, CollectionSummary>(&format!(
            r"{COLLECTION_SELECT}
              AND ($1::text IS NULL OR LOWER(c.season) = LOWER($1))
            ORDER BY c.sort_order ASC, c.name ASC"
        ))
        .bind(season)
        .fetch_all(self.pool)
        .await?;

        Ok(collections)
    }

    /// An active collection by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<CollectionSummary>, RepositoryError> {
        let collection = sqlx::query_as::<_, CollectionSummary>(&format!(
            "{COLLECTION_SELECT} AND c.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(collection)
    }
}
