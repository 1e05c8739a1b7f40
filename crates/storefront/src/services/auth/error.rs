//! Authentication error types.

use thiserror::Error;

use luxora_core::password::PasswordError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] luxora_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The current password given for a password change is wrong.
    #[error("current password is incorrect")]
    WrongCurrentPassword,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("an account with this email already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("{0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Length => Self::WeakPassword(err.to_string()),
            PasswordError::Mismatch => Self::InvalidCredentials,
            PasswordError::Hash => Self::PasswordHash,
        }
    }
}
