//! Admin account bootstrap.
//!
//! # Usage
//!
//! ```bash
//! luxora-cli admin create -e admin@example.com -n "Admin Name" -p 'long-password'
//! ```
//!
//! The password may also come from `LUXORA_ADMIN_PASSWORD`.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or `ADMIN_DATABASE_URL`) - `PostgreSQL` connection string

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use luxora_core::password::{PasswordError, hash_password, validate_password};
use luxora_core::{Email, EmailError, UserId, UserRole};

use super::{CommandError, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password too short, too long or unhashable.
    #[error("Invalid password: {0}")]
    Password(#[from] PasswordError),

    /// The account belongs to a store owner.
    #[error("{0} owns a store and cannot be made an admin")]
    OwnsStore(String),
}

/// Create an admin account. An existing account with the same email is
/// promoted to `ADMIN` and given the new password.
///
/// # Returns
///
/// The ID of the admin user.
///
/// # Errors
///
/// Returns an error if the input is invalid, the account owns a store, or
/// the database is unreachable.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<UserId, AdminError> {
    let email = Email::parse(email)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let database_url = database_url()?;
    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let owns_store: bool = sqlx::query_scalar(
        r"
        SELECT EXISTS (
            SELECT 1 FROM luxora.merchants m
            JOIN luxora.users u ON u.id = m.owner_id
            WHERE LOWER(u.email) = LOWER($1)
        )
        ",
    )
    .bind(email.as_str())
    .fetch_one(&pool)
    .await?;
    if owns_store {
        return Err(AdminError::OwnsStore(email.into_inner()));
    }

    let user_id = sqlx::query_scalar::<_, UserId>(
        r"
        INSERT INTO luxora.users (email, name, role, password_hash)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT ((LOWER(email))) DO UPDATE
            SET name = EXCLUDED.name, role = EXCLUDED.role,
                password_hash = EXCLUDED.password_hash
        RETURNING id
        ",
    )
    .bind(email.as_str())
    .bind(name.trim())
    .bind(UserRole::Admin)
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Admin user ready! ID: {}, Email: {}",
        user_id,
        email.as_str()
    );

    Ok(user_id)
}
