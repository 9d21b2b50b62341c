//! Admin authentication: argon2 password verification and account creation.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use argon2::Argon2;
use sqlx::PgPool;
use thiserror::Error;

use jademart_core::{AdminRole, Email, EmailError as EmailParseError};

use crate::db::{AdminUserRepository, RepositoryError};
use crate::models::admin_user::AdminUser;

/// Minimum password length for admin accounts.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Maximum display name length.
const MAX_NAME_LENGTH: usize = 100;

/// Errors that can occur during admin authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailParseError),

    /// Email or password is wrong. Deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("admin account already exists")]
    AccountAlreadyExists,

    /// Password or name fails validation.
    #[error("{0}")]
    InvalidInput(String),

    /// Underlying repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,
}

/// Admin authentication service.
pub struct AuthService<'a> {
    accounts: AdminUserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new auth service over the admin pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            accounts: AdminUserRepository::new(pool),
        }
    }

    /// Verify credentials and return the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or a
    /// wrong password, without distinguishing the two.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AuthError> {
        let email = Email::parse(&email.to_lowercase())?;

        let Some((account, hash)) = self.accounts.get_with_password(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &hash) {
            return Err(AuthError::InvalidCredentials);
        }

        if !account.active {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` for a weak password or bad name,
    /// and `AuthError::AccountAlreadyExists` for a duplicate email.
    pub async fn create_account(
        &self,
        email: &str,
        name: &str,
        role: AdminRole,
        password: &str,
    ) -> Result<AdminUser, AuthError> {
        let email = Email::parse(&email.to_lowercase())?;

        let name = name.trim();
        if name.is_empty() || name.len() > MAX_NAME_LENGTH {
            return Err(AuthError::InvalidInput(format!(
                "name must be 1-{MAX_NAME_LENGTH} characters"
            )));
        }
        validate_password(password)?;

        let hash = hash_password(password)?;
        match self.accounts.create(&email, name, role, &hash).await {
            Ok(account) => Ok(account),
            Err(RepositoryError::Conflict(_)) => Err(AuthError::AccountAlreadyExists),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reject passwords shorter than the admin minimum.
///
/// # Errors
///
/// Returns `AuthError::InvalidInput` describing the requirement.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with argon2 and a fresh salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored argon2 hash.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough password").is_ok());
    }
}
