//! Authentication service.
//!
//! Password registration, login and password change for customer accounts.

mod error;

pub use error::AuthError;

use sqlx::PgPool;

use luxora_core::password::{PasswordError, hash_password, validate_password, verify_password};
use luxora_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new customer with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.users
            .create(&email, name.trim(), &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // A malformed email can never match an account.
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Change a user's password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WrongCurrentPassword` if `current` does not match.
    /// Returns `AuthError::WeakPassword` if `new` doesn't meet requirements.
    pub async fn change_password(
        &self,
        user: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let stored = self.users.get_password_hash(user).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::Repository(other),
        })?;

        verify_password(current, &stored).map_err(|e| match e {
            PasswordError::Mismatch => AuthError::WrongCurrentPassword,
            other => other.into(),
        })?;

        validate_password(new)?;
        let password_hash = hash_password(new)?;
        self.users.set_password_hash(user, &password_hash).await?;

        tracing::info!(user_id = %user, "password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_error_mapping() {
        assert!(matches!(
            AuthError::from(PasswordError::Length),
            AuthError::WeakPassword(_)
        ));
        assert!(matches!(
            AuthError::from(PasswordError::Mismatch),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from(PasswordError::Hash),
            AuthError::PasswordHash
        ));
    }
}
