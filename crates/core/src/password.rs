//! Password rules and Argon2id hashing.
//!
//! Shared by storefront sign-up, merchant registration, the admin password
//! change and the CLI `admin create` command.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in characters.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Errors from password validation and hashing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// Too short or too long.
    #[error("password must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH} characters")]
    Length,

    /// The password did not match the stored hash.
    #[error("invalid credentials")]
    Mismatch,

    /// The stored hash could not be parsed or produced.
    #[error("password hashing error")]
    Hash,
}

/// Check a new password against the length rules.
///
/// # Errors
///
/// Returns [`PasswordError::Length`] if the password is too short or too long.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
        Ok(())
    } else {
        Err(PasswordError::Length)
    }
}

/// Hash a password using Argon2id with a random salt.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

/// Verify a password against a stored PHC hash string.
///
/// # Errors
///
/// Returns [`PasswordError::Mismatch`] on a wrong password and
/// [`PasswordError::Hash`] if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::Hash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| PasswordError::Mismatch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert_eq!(validate_password("short"), Err(PasswordError::Length));
        assert!(validate_password("long enough").is_ok());
        assert_eq!(validate_password(&"x".repeat(200)), Err(PasswordError::Length));
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert_eq!(
            verify_password("battery staple", &hash),
            Err(PasswordError::Mismatch)
        );
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash() {
        assert_eq!(verify_password("anything", "not-a-hash"), Err(PasswordError::Hash));
    }
}
