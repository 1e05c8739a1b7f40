//! In-memory catalog cache.
//!
//! Collections change rarely and are read on every landing page, so they are
//! cached for 5 minutes using `moka`.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use crate::db::{CollectionRepository, ProductRepository, RepositoryError};
use crate::models::{CollectionDetail, CollectionSummary};

/// Time to live of cached entries.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Maximum number of cached entries.
const CACHE_CAPACITY: u64 = 1000;

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Collections(Arc<Vec<CollectionSummary>>),
    Collection(Arc<CollectionDetail>),
}

/// Read-through cache for collection listings.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<String, CacheValue>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// Active collections, optionally filtered by season.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn collections(
        &self,
        pool: &PgPool,
        season: Option<&str>,
    ) -> Result<Arc<Vec<CollectionSummary>>, RepositoryError> {
        let season = season.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());
        let key = format!("collections:{}", season.as_deref().unwrap_or(""));

        if let Some(CacheValue::Collections(list)) = self.cache.get(&key).await {
            debug!(key, "cache hit");
            return Ok(list);
        }

        let list = Arc::new(
            CollectionRepository::new(pool)
                .list_active(season.as_deref())
                .await?,
        );
        self.cache
            .insert(key, CacheValue::Collections(Arc::clone(&list)))
            .await;
        Ok(list)
    }

    /// An active collection with its visible products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn collection(
        &self,
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Arc<CollectionDetail>>, RepositoryError> {
        let key = format!("collection:{slug}");

        if let Some(CacheValue::Collection(detail)) = self.cache.get(&key).await {
            debug!(key, "cache hit");
            return Ok(Some(detail));
        }

        let Some(collection) = CollectionRepository::new(pool).get_active_by_slug(slug).await? else {
            return Ok(None);
        };
        let products = ProductRepository::new(pool)
            .by_collection(collection.id)
            .await?;

        let detail = Arc::new(CollectionDetail {
            collection,
            products,
        });
        self.cache
            .insert(key, CacheValue::Collection(Arc::clone(&detail)))
            .await;
        Ok(Some(detail))
    }
}
