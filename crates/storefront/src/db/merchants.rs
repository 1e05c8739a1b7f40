//! Merchant repository (public storefront pages).

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::MerchantProfile;

/// Repository for public merchant profiles.
pub struct MerchantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MerchantRepository<'a> {
    /// Create a new merchant repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// An active merchant by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<MerchantProfile>, RepositoryError> {
        let merchant = sqlx::query_as::<_, MerchantProfile>(
            r"
            SELECT id, name, slug, description, logo_url, banner_url,
                   return_policy, shipping_policy, privacy_policy,
                   seo_title, seo_description, seo_keywords,
                   free_shipping_threshold, processing_days, created_at
            FROM luxora.merchants
            WHERE slug = $1 AND status = 'ACTIVE'
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(merchant)
    }
}
