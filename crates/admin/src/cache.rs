//! In-memory dashboard statistics cache.
//!
//! The stat cards aggregate every order of the month, so they are computed at
//! most once a minute per scope using `moka`. Revenue series, activity and
//! top products are always read live.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use luxora_core::MerchantId;

use crate::db::{DashboardRepository, RepositoryError, Scope};
use crate::models::{MerchantStats, PlatformStats};

/// Time to live of cached stats.
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Maximum number of cached scopes.
const CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
enum CachedStats {
    Platform(Arc<PlatformStats>),
    Merchant(Arc<MerchantStats>),
}

/// Read-through cache for dashboard stat cards.
#[derive(Clone)]
pub struct StatsCache {
    cache: Cache<Scope, CachedStats>,
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsCache {
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

    /// Platform-wide stats for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn platform(&self, pool: &PgPool) -> Result<Arc<PlatformStats>, RepositoryError> {
        if let Some(CachedStats::Platform(stats)) = self.cache.get(&Scope::Platform).await {
            debug!("platform stats cache hit");
            return Ok(stats);
        }

        let stats = Arc::new(DashboardRepository::new(pool).platform_stats(Utc::now()).await?);
        self.cache
            .insert(Scope::Platform, CachedStats::Platform(Arc::clone(&stats)))
            .await;
        Ok(stats)
    }

    /// One store's stats for the merchant dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn merchant(
        &self,
        pool: &PgPool,
        merchant: MerchantId,
    ) -> Result<Arc<MerchantStats>, RepositoryError> {
        let key = Scope::Merchant(merchant);
        if let Some(CachedStats::Merchant(stats)) = self.cache.get(&key).await {
            debug!(merchant_id = %merchant, "merchant stats cache hit");
            return Ok(stats);
        }

        let stats = Arc::new(
            DashboardRepository::new(pool)
                .merchant_stats(merchant, Utc::now())
                .await?,
        );
        self.cache
            .insert(key, CachedStats::Merchant(Arc::clone(&stats)))
            .await;
        Ok(stats)
    }

    /// Drop every cached entry, e.g. after an order status change.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
