//! Database operations for the dashboards.
//!
//! # Schema: `luxora` (shared with the storefront)
//!
//! ## Tables
//!
//! - `users` - Accounts; `ADMIN` and `MERCHANT` roles sign in here
//! - `merchants` - Stores, their status and settings
//! - `products`, `collections`, `collection_products` - Catalog management
//! - `orders`, `order_items` - Fulfilment and reporting
//! - `reviews` - Activity feed only
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `migrations/` at the repository root and run via:
//! ```bash
//! cargo run -p luxora-cli -- migrate
//! ```

pub mod collections;
pub mod dashboard;
pub mod merchants;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;

use luxora_core::TransitionError;
use luxora_core::slug::with_suffix;

pub use collections::CollectionRepository;
pub use dashboard::{DashboardRepository, Scope};
pub use merchants::MerchantRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Input the database layer cannot use (e.g. a name with no slug).
    #[error("invalid input: {0}")]
    Invalid(String),

    /// Status change not allowed from the stored status.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict`, everything else to `Database`.
    pub(crate) fn on_unique(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(err)
    }
}

/// Tables with a unique `slug` column.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SlugTable {
    Merchants,
    Products,
    Collections,
}

impl SlugTable {
    const fn name(self) -> &'static str {
        match self {
            Self::Merchants => "luxora.merchants",
            Self::Products => "luxora.products",
            Self::Collections => "luxora.collections",
        }
    }
}

/// Attempts before giving up on finding a free slug.
const MAX_SLUG_ATTEMPTS: u32 = 50;

/// First free slug among `base`, `base-2`, `base-3`, ...
///
/// The unique index still guards against a concurrent insert taking the
/// returned slug; callers map that violation to `Conflict`.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if every candidate is taken.
pub(crate) async fn free_slug(
    conn: &mut PgConnection,
    table: SlugTable,
    base: &str,
) -> Result<String, RepositoryError> {
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE slug = $1)", table.name());

    for n in 1..=MAX_SLUG_ATTEMPTS {
        let candidate = if n == 1 {
            base.to_owned()
        } else {
            with_suffix(base, n)
        };
        let taken: bool = sqlx::query_scalar(&sql)
            .bind(&candidate)
            .fetch_one(&mut *conn)
            .await?;
        if !taken {
            return Ok(candidate);
        }
    }

    Err(RepositoryError::Conflict(format!(
        "no free slug for '{base}'"
    )))
}

/// `ILIKE` pattern for a free-text search box; `None` when blank.
pub(crate) fn search_pattern(query: Option<&str>) -> Option<String> {
    let q = query.map(str::trim).filter(|q| !q.is_empty())?;
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_pattern() {
        assert_eq!(search_pattern(None), None);
        assert_eq!(search_pattern(Some("   ")), None);
        assert_eq!(search_pattern(Some(" tote ")), Some("%tote%".to_string()));
        assert_eq!(search_pattern(Some("50%_off")), Some(r"%50\%\_off%".to_string()));
    }
}
