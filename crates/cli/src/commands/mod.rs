//! CLI subcommands.

pub mod admin;
pub mod migrate;

use secrecy::SecretString;

/// Errors shared by the subcommands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Database URL from `DATABASE_URL`, falling back to the admin service's
/// variable.
///
/// # Errors
///
/// Returns [`CommandError::MissingEnvVar`] if neither variable is set.
pub fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("ADMIN_DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))
}
