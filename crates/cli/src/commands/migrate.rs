//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! luxora-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or `ADMIN_DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Both services share one database and schema (`luxora`); migrations live
//! in `migrations/` at the repository root and are embedded at compile time.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::{CommandError, database_url};

/// Errors from running migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../../migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
