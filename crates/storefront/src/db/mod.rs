//! Database operations for the storefront.
//!
//! # Schema: `luxora`
//!
//! The storefront reads the catalog and writes the shopper's own data:
//!
//! ## Tables
//!
//! - `users` - Customer accounts and preferences
//! - `merchants`, `products`, `collections`, `collection_products` - Catalog (read-only here)
//! - `reviews` - One review per user and product
//! - `cart_items`, `wishlist_items` - Per-user selections
//! - `orders`, `order_items` - Written by checkout
//! - `payment_methods` - Tokenized card metadata
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `migrations/` at the repository root and run via:
//! ```bash
//! cargo run -p luxora-cli -- migrate
//! ```

pub mod cart;
pub mod collections;
pub mod merchants;
pub mod orders;
pub mod payment_methods;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart::CartRepository;
pub use collections::CollectionRepository;
pub use merchants::MerchantRepository;
pub use orders::OrderRepository;
pub use payment_methods::PaymentMethodRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

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
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
