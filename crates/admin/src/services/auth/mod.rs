//! Authentication service.
//!
//! Staff sign-in for the dashboards and public merchant applications.

mod error;

pub use error::AuthError;

use sqlx::PgPool;

use luxora_core::password::{hash_password, validate_password, verify_password};
use luxora_core::{Email, MerchantId};

use crate::db::merchants::{MerchantApplication, MerchantProfileInput};
use crate::db::users::StaffAccount;
use crate::db::{MerchantRepository, RepositoryError, UserRepository};

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    merchants: MerchantRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            merchants: MerchantRepository::new(pool),
        }
    }

    /// Login with email and password. Only admins and merchants get in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::NotStaff` if the account is a customer account.
    pub async fn login(&self, email: &str, password: &str) -> Result<StaffAccount, AuthError> {
        // A malformed email can never match an account.
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (account, password_hash) = self
            .users
            .get_with_password(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !account.0.role.can_use_dashboard() {
            return Err(AuthError::NotStaff);
        }
        Ok(account)
    }

    /// Apply for a store: creates a `MERCHANT` account and a `PENDING` store
    /// awaiting admin approval.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register_merchant(
        &self,
        email: &str,
        name: &str,
        password: &str,
        store: MerchantProfileInput<'_>,
    ) -> Result<MerchantId, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let application = MerchantApplication {
            owner_email: &email,
            owner_name: name.trim(),
            password_hash: &password_hash,
            store,
        };

        let id = self
            .merchants
            .register(&application)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(merchant_id = %id, "merchant application received");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use luxora_core::password::PasswordError;

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
    }
}
