//! Admin user management commands.
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for the admin database

use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;

use jademart_admin::services::auth::{AuthError, hash_password};
use jademart_core::AdminRole;

/// Length of generated admin passwords.
const GENERATED_PASSWORD_LENGTH: usize = 24;

const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminCommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// User already exists.
    #[error("Admin user already exists with email: {0}")]
    UserExists(String),

    /// Password hashing failed.
    #[error("Password hashing failed")]
    PasswordHash,
}

impl From<AuthError> for AdminCommandError {
    fn from(_: AuthError) -> Self {
        Self::PasswordHash
    }
}

/// Create a new admin user with a generated password.
///
/// The password is printed to stdout exactly once; it is stored only as
/// an argon2 hash.
///
/// # Errors
///
/// Returns `AdminCommandError` for a bad role/email, a duplicate account,
/// or a database failure.
pub async fn create_user(email: &str, name: &str, role: &str) -> Result<i32, AdminCommandError> {
    dotenvy::dotenv().ok();

    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminCommandError::InvalidRole(role.to_owned()))?;

    let email = email.trim().to_lowercase();
    if !email.contains('@') || !email.contains('.') {
        return Err(AdminCommandError::InvalidEmail(email));
    }

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .map_err(|_| AdminCommandError::MissingEnvVar("ADMIN_DATABASE_URL"))?;

    tracing::info!("Connecting to admin database...");
    let pool = PgPool::connect(&database_url).await?;

    let existing: Option<i32> =
        sqlx::query_scalar("SELECT id FROM admin.admin_user WHERE email = $1")
            .bind(&email)
            .fetch_optional(&pool)
            .await?;
    if existing.is_some() {
        return Err(AdminCommandError::UserExists(email));
    }

    let password = generate_password();
    let password_hash = hash_password(&password)?;

    let user_id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO admin.admin_user (email, name, role, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        ",
    )
    .bind(&email)
    .bind(name)
    .bind(role.to_string())
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Admin user created: id={}, email={}, role={}", user_id, email, role);

    #[allow(clippy::print_stdout)]
    {
        println!("Admin user created.");
        println!("  Email:    {email}");
        println!("  Role:     {role}");
        println!("  Password: {password}");
        println!("This password is shown once and stored only as a hash.");
    }

    Ok(user_id)
}

/// Generate a random password from an unambiguous alphabet.
fn generate_password() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_PASSWORD_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..PASSWORD_ALPHABET.len());
            PASSWORD_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_password_shape() {
        let password = generate_password();
        assert_eq!(password.len(), GENERATED_PASSWORD_LENGTH);
        assert!(password.bytes().all(|b| PASSWORD_ALPHABET.contains(&b)));
    }
}
