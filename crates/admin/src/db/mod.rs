//! Database operations for the admin panel.
//!
//! The admin binary holds two pools:
//!
//! - **admin database** (`jm_admin`, schema `admin`): admin accounts and
//!   admin sessions. Migrations live in `crates/admin/migrations/`.
//! - **shop database** (`jm_shop`, schema `shop`): the catalog, orders,
//!   invoices, content and fleet tables owned by the storefront's
//!   migrations. The admin writes to them but never migrates them.
//!
//! ```bash
//! cargo run -p jademart-cli -- migrate admin
//! ```

pub mod admin_users;
pub mod catalog;
pub mod content;
pub mod dashboard;
pub mod invoices;
pub mod logistics;
pub mod newsletter;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use catalog::{BrandRepository, CategoryRepository, ProductRepository};
pub use content::ContentRepository;
pub use dashboard::DashboardRepository;
pub use invoices::InvoiceRepository;
pub use logistics::LogisticsRepository;
pub use newsletter::NewsletterRepository;
pub use orders::OrderRepository;

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

    /// Constraint violation (e.g., unique slug or plate).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-violation database error to `Conflict`, leaving other
    /// errors as `Database`.
    fn from_unique(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_string());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
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

/// Shorthand for mapping a stored enum string into its domain type.
fn corrupt(what: &str, detail: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::DataCorruption(format!("invalid {what} in database: {detail}"))
}
