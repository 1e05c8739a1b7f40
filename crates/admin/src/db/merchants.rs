//! Merchant repository: admin merchant management, merchant settings and
//! public merchant applications.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use luxora_core::pagination::{Page, Paginated};
use luxora_core::{Email, MerchantId, MerchantStatus, UserId, UserRole};

use super::{RepositoryError, SlugTable, free_slug, search_pattern};
use crate::models::{
    MerchantDetail, MerchantLiveStats, MerchantSettings, MerchantSummary, SettingsPatch,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct MerchantRow {
    id: MerchantId,
    owner_id: UserId,
    owner_name: String,
    owner_email: String,
    name: String,
    slug: String,
    description: Option<String>,
    email: String,
    phone: Option<String>,
    logo_url: Option<String>,
    banner_url: Option<String>,
    status: MerchantStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MerchantRow {
    fn into_detail(self, stats: MerchantLiveStats) -> MerchantDetail {
        MerchantDetail {
            id: self.id,
            owner_id: self.owner_id,
            owner_name: self.owner_name,
            owner_email: self.owner_email,
            name: self.name,
            slug: self.slug,
            description: self.description,
            email: self.email,
            phone: self.phone,
            logo_url: self.logo_url,
            banner_url: self.banner_url,
            status: self.status,
            stats,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const SETTINGS_COLUMNS: &str = r"
    id, name, slug, description, email, phone, logo_url, banner_url, status,
    payout_email, payout_schedule, shipping_origin, processing_days,
    free_shipping_threshold, notify_new_order, notify_low_stock, notify_reviews,
    low_stock_threshold, return_policy, shipping_policy, privacy_policy,
    seo_title, seo_description, seo_keywords, updated_at
";

// =============================================================================
// Inputs
// =============================================================================

/// Merchant list filters.
#[derive(Debug, Clone, Default)]
pub struct MerchantFilter {
    pub status: Option<MerchantStatus>,
    /// Matches store name, slug or contact email.
    pub query: Option<String>,
}

/// Store profile fields set on creation and by the admin profile editor.
#[derive(Debug)]
pub struct MerchantProfileInput<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub logo_url: Option<&'a str>,
    pub banner_url: Option<&'a str>,
}

/// Account and store created by a public merchant application.
#[derive(Debug)]
pub struct MerchantApplication<'a> {
    pub owner_email: &'a Email,
    pub owner_name: &'a str,
    pub password_hash: &'a str,
    pub store: MerchantProfileInput<'a>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &MerchantFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND m.status = ").push_bind(status);
    }
    if let Some(pattern) = search_pattern(filter.query.as_deref()) {
        qb.push(" AND (m.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR m.slug ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR m.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Trimmed text, `None` when blank.
fn clean(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for merchants.
pub struct MerchantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MerchantRepository<'a> {
    /// Create a new merchant repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List merchants, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &MerchantFilter,
        page: Page,
    ) -> Result<Paginated<MerchantSummary>, RepositoryError> {
        let mut count =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM luxora.merchants m WHERE TRUE");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(
            r"
            SELECT m.id, m.name, m.slug, m.email, m.status, u.name AS owner_name,
                   (SELECT COUNT(*) FROM luxora.products p
                    WHERE p.merchant_id = m.id AND p.status <> 'ARCHIVED') AS product_count,
                   m.created_at
            FROM luxora.merchants m
            JOIN luxora.users u ON u.id = m.owner_id
            WHERE TRUE
            ",
        );
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY m.created_at DESC, m.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let merchants: Vec<MerchantSummary> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok(Paginated::new(merchants, page, total))
    }

    /// Merchant detail with figures computed from current data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: MerchantId) -> Result<Option<MerchantDetail>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, MerchantRow>(
            r"
            SELECT m.id, m.owner_id, u.name AS owner_name, u.email AS owner_email,
                   m.name, m.slug, m.description, m.email, m.phone, m.logo_url,
                   m.banner_url, m.status, m.created_at, m.updated_at
            FROM luxora.merchants m
            JOIN luxora.users u ON u.id = m.owner_id
            WHERE m.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let stats = sqlx::query_as::<_, MerchantLiveStats>(
            r"
            SELECT
                (SELECT COUNT(*) FROM luxora.products
                 WHERE merchant_id = $1 AND status <> 'ARCHIVED') AS product_count,
                (SELECT COUNT(*) FROM luxora.products
                 WHERE merchant_id = $1 AND status = 'ACTIVE') AS active_product_count,
                COUNT(DISTINCT o.id) AS order_count,
                COALESCE(SUM(oi.quantity), 0)::bigint AS units_sold,
                COALESCE(SUM(oi.unit_price * oi.quantity - oi.line_discount), 0) AS revenue
            FROM luxora.order_items oi
            JOIN luxora.orders o ON o.id = oi.order_id
            WHERE oi.merchant_id = $1 AND o.status <> 'CANCELLED'
            ",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(Some(row.into_detail(stats)))
    }

    /// Current status of a merchant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status(&self, id: MerchantId) -> Result<Option<MerchantStatus>, RepositoryError> {
        let status = sqlx::query_scalar::<_, MerchantStatus>(
            "SELECT status FROM luxora.merchants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(status)
    }

    /// Open a store for an existing account and make the account a merchant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the account already owns a store
    /// or is an admin.
    pub async fn create(
        &self,
        owner: UserId,
        store: &MerchantProfileInput<'_>,
        status: MerchantStatus,
    ) -> Result<MerchantId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let role = sqlx::query_scalar::<_, UserRole>(
            "SELECT role FROM luxora.users WHERE id = $1 FOR UPDATE",
        )
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        if role == UserRole::Admin {
            return Err(RepositoryError::Conflict(
                "admins cannot own a store".to_string(),
            ));
        }

        let id = insert_merchant(&mut *tx, owner, store, status).await?;

        sqlx::query("UPDATE luxora.users SET role = 'MERCHANT' WHERE id = $1")
            .bind(owner)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Create a `MERCHANT` account and its `PENDING` store in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn register(
        &self,
        application: &MerchantApplication<'_>,
    ) -> Result<MerchantId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let owner = sqlx::query_scalar::<_, UserId>(
            r"
            INSERT INTO luxora.users (email, name, password_hash, role)
            VALUES ($1, $2, $3, 'MERCHANT')
            RETURNING id
            ",
        )
        .bind(application.owner_email.as_str())
        .bind(application.owner_name)
        .bind(application.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::on_unique(e, "email already exists"))?;

        let id = insert_merchant(&mut *tx, owner, &application.store, MerchantStatus::Pending)
            .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Replace the store profile. The slug is kept so existing links work.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the merchant does not exist.
    pub async fn update_profile(
        &self,
        id: MerchantId,
        store: &MerchantProfileInput<'_>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE luxora.merchants
            SET name = $2, description = $3, email = $4, phone = $5,
                logo_url = $6, banner_url = $7
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(store.name.trim())
        .bind(clean(store.description))
        .bind(store.email.trim())
        .bind(clean(store.phone))
        .bind(clean(store.logo_url))
        .bind(clean(store.banner_url))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Move a merchant through its lifecycle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the merchant does not exist and
    /// `RepositoryError::Transition` if the change is not allowed.
    pub async fn transition(
        &self,
        id: MerchantId,
        next: MerchantStatus,
    ) -> Result<MerchantStatus, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, MerchantStatus>(
            "SELECT status FROM luxora.merchants WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let next = current.transition(next)?;

        sqlx::query("UPDATE luxora.merchants SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(next)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(next)
    }

    /// Store settings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn settings(
        &self,
        id: MerchantId,
    ) -> Result<Option<MerchantSettings>, RepositoryError> {
        let settings = sqlx::query_as::<_, MerchantSettings>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM luxora.merchants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(settings)
    }

    /// Write only the supplied settings, in a single `UPDATE`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the merchant does not exist.
    pub async fn update_settings(
        &self,
        id: MerchantId,
        patch: &SettingsPatch,
    ) -> Result<MerchantSettings, RepositoryError> {
        if patch.is_empty() {
            return self.settings(id).await?.ok_or(RepositoryError::NotFound);
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE luxora.merchants SET ");
        push_assignments(&mut qb, patch);
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(SETTINGS_COLUMNS);

        qb.build_query_as::<MerchantSettings>()
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

/// Insert a store row with a free slug derived from its name.
async fn insert_merchant(
    conn: &mut sqlx::PgConnection,
    owner: UserId,
    store: &MerchantProfileInput<'_>,
    status: MerchantStatus,
) -> Result<MerchantId, RepositoryError> {
    let base = luxora_core::slug::slugify(store.name)
        .map_err(|e| RepositoryError::Invalid(e.to_string()))?;
    let slug = free_slug(&mut *conn, SlugTable::Merchants, &base).await?;

    sqlx::query_scalar::<_, MerchantId>(
        r"
        INSERT INTO luxora.merchants
            (owner_id, name, slug, description, email, phone, logo_url, banner_url, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        ",
    )
    .bind(owner)
    .bind(store.name.trim())
    .bind(&slug)
    .bind(clean(store.description))
    .bind(store.email.trim())
    .bind(clean(store.phone))
    .bind(clean(store.logo_url))
    .bind(clean(store.banner_url))
    .bind(status)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RepositoryError::on_unique(e, "account already owns a store"))
}

/// Append `column = $n` for every supplied field.
fn push_assignments(qb: &mut QueryBuilder<'_, Postgres>, patch: &SettingsPatch) {
    let mut set = qb.separated(", ");

    if let Some(name) = &patch.name {
        set.push("name = ").push_bind_unseparated(name.trim().to_owned());
    }
    if let Some(email) = &patch.email {
        set.push("email = ").push_bind_unseparated(email.trim().to_owned());
    }
    if let Some(schedule) = &patch.payout_schedule {
        set.push("payout_schedule = ").push_bind_unseparated(schedule.clone());
    }

    // Optional text: blank clears the column
    let optional_text = [
        ("description", &patch.description),
        ("phone", &patch.phone),
        ("logo_url", &patch.logo_url),
        ("banner_url", &patch.banner_url),
        ("payout_email", &patch.payout_email),
        ("shipping_origin", &patch.shipping_origin),
        ("return_policy", &patch.return_policy),
        ("shipping_policy", &patch.shipping_policy),
        ("privacy_policy", &patch.privacy_policy),
        ("seo_title", &patch.seo_title),
        ("seo_description", &patch.seo_description),
    ];
    for (column, value) in optional_text {
        if let Some(value) = value {
            set.push(format!("{column} = "))
                .push_bind_unseparated(clean(Some(value.as_str())));
        }
    }

    if let Some(days) = patch.processing_days {
        set.push("processing_days = ").push_bind_unseparated(days);
    }
    if let Some(threshold) = patch.free_shipping_threshold {
        set.push("free_shipping_threshold = ")
            .push_bind_unseparated(threshold);
    }
    if let Some(threshold) = patch.low_stock_threshold {
        set.push("low_stock_threshold = ")
            .push_bind_unseparated(threshold);
    }

    let flags = [
        ("notify_new_order", patch.notify_new_order),
        ("notify_low_stock", patch.notify_low_stock),
        ("notify_reviews", patch.notify_reviews),
    ];
    for (column, value) in flags {
        if let Some(value) = value {
            set.push(format!("{column} = ")).push_bind_unseparated(value);
        }
    }

    if let Some(keywords) = &patch.seo_keywords {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty())
            .collect();
        set.push("seo_keywords = ").push_bind_unseparated(keywords);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_sql(patch: &SettingsPatch) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE luxora.merchants SET ");
        push_assignments(&mut qb, patch);
        qb.sql().to_string()
    }

    #[test]
    fn test_only_supplied_fields_are_written() {
        let patch = SettingsPatch {
            notify_reviews: Some(false),
            seo_title: Some("Handmade leather".to_string()),
            ..SettingsPatch::default()
        };
        assert_eq!(
            update_sql(&patch),
            "UPDATE luxora.merchants SET seo_title = $1, notify_reviews = $2"
        );
    }

    #[test]
    fn test_all_groups_in_one_statement() {
        let patch = SettingsPatch {
            name: Some("Atelier Nord".to_string()),
            processing_days: Some(3),
            seo_keywords: Some(vec!["leather".to_string()]),
            ..SettingsPatch::default()
        };
        let sql = update_sql(&patch);
        assert_eq!(sql.matches("UPDATE").count(), 1);
        assert!(sql.contains("name = $1"));
        assert!(sql.contains("processing_days = $2"));
        assert!(sql.contains("seo_keywords = $3"));
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(Some("  ")), None);
        assert_eq!(clean(Some(" +1 555 ")), Some("+1 555".to_string()));
        assert_eq!(clean(None), None);
    }
}
