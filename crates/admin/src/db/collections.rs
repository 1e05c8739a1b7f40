//! Collection repository.

use sqlx::PgPool;

use luxora_core::slug::slugify;
use luxora_core::{CollectionId, ProductId};

use super::{RepositoryError, SlugTable, free_slug};
use crate::models::{Collection, CollectionDetail, CollectionInput, CollectionProduct};

const COLLECTION_SELECT: &str = r"
    SELECT c.id, c.name, c.slug, c.description, c.season, c.image_url, c.is_active,
           c.sort_order, c.created_at, c.updated_at,
           (SELECT COUNT(*) FROM luxora.collection_products cp WHERE cp.collection_id = c.id)
               AS product_count
    FROM luxora.collections c
";

fn clean(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Repository for curated collections and their membership.
pub struct CollectionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CollectionRepository<'a> {
    /// Create a new collection repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All collections, active or not, in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Collection>, RepositoryError> {
        let collections = sqlx::query_as::<_, Collection>(&format!(
            "{COLLECTION_SELECT} ORDER BY c.sort_order, c.name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(collections)
    }

    /// A collection and its products by position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: CollectionId) -> Result<Option<CollectionDetail>, RepositoryError> {
        let Some(collection) =
            sqlx::query_as::<_, Collection>(&format!("{COLLECTION_SELECT} WHERE c.id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?
        else {
            return Ok(None);
        };

        let products = sqlx::query_as::<_, CollectionProduct>(
            r"
            SELECT p.id, p.name, p.slug, p.status, m.name AS merchant_name, cp.position
            FROM luxora.collection_products cp
            JOIN luxora.products p ON p.id = cp.product_id
            JOIN luxora.merchants m ON m.id = p.merchant_id
            WHERE cp.collection_id = $1
            ORDER BY cp.position, p.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(CollectionDetail {
            collection,
            products,
        }))
    }

    /// Create a collection with a free slug derived from its name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the name has no slug characters.
    pub async fn create(&self, input: &CollectionInput) -> Result<CollectionId, RepositoryError> {
        let base = slugify(&input.name).map_err(|e| RepositoryError::Invalid(e.to_string()))?;
        let mut tx = self.pool.begin().await?;
        let slug = free_slug(&mut tx, SlugTable::Collections, &base).await?;

        let id = sqlx::query_scalar::<_, CollectionId>(
            r"
            INSERT INTO luxora.collections
                (name, slug, description, season, image_url, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(input.name.trim())
        .bind(&slug)
        .bind(input.description.trim())
        .bind(clean(input.season.as_ref()))
        .bind(clean(input.image_url.as_ref()))
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::on_unique(e, "slug already exists"))?;

        tx.commit().await?;
        Ok(id)
    }

    /// Replace a collection's fields. The slug is kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the collection does not exist.
    pub async fn update(
        &self,
        id: CollectionId,
        input: &CollectionInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE luxora.collections
            SET name = $2, description = $3, season = $4, image_url = $5,
                is_active = $6, sort_order = $7
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.description.trim())
        .bind(clean(input.season.as_ref()))
        .bind(clean(input.image_url.as_ref()))
        .bind(input.is_active)
        .bind(input.sort_order)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a collection. Membership rows go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the collection does not exist.
    pub async fn delete(&self, id: CollectionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM luxora.collections WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Replace the membership with `product_ids`, positioned in the given
    /// order. Duplicates keep their first position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the collection does not exist
    /// and `RepositoryError::Invalid` if a product does not exist.
    pub async fn replace_products(
        &self,
        id: CollectionId,
        product_ids: &[ProductId],
    ) -> Result<(), RepositoryError> {
        let ids = dedup_in_order(product_ids);
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, CollectionId>(
            "SELECT id FROM luxora.collections WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let known: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM luxora.products WHERE id = ANY($1)")
                .bind(&ids)
                .fetch_one(&mut *tx)
                .await?;
        if usize::try_from(known).ok() != Some(ids.len()) {
            return Err(RepositoryError::Invalid("unknown product in list".to_string()));
        }

        sqlx::query("DELETE FROM luxora.collection_products WHERE collection_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            INSERT INTO luxora.collection_products (collection_id, product_id, position)
            SELECT $1, item.product_id, (item.ord - 1)::int
            FROM UNNEST($2::int[]) WITH ORDINALITY AS item(product_id, ord)
            ",
        )
        .bind(id)
        .bind(&ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn dedup_in_order(ids: &[ProductId]) -> Vec<ProductId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_position() {
        let ids = [3, 1, 3, 2, 1].map(ProductId::new);
        let kept: Vec<i32> = dedup_in_order(&ids).iter().map(ProductId::as_i32).collect();
        assert_eq!(kept, [3, 1, 2]);
    }

    #[test]
    fn test_clean_blanks() {
        let blank = "  ".to_string();
        let season = " Summer ".to_string();
        assert_eq!(clean(Some(&blank)), None);
        assert_eq!(clean(Some(&season)), Some("Summer"));
        assert_eq!(clean(None), None);
    }
}
