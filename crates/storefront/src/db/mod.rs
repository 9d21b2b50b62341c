//! Database operations for the shop `PostgreSQL` database.
//!
//! # Database: `jm_shop`, schema `shop`
//!
//! The storefront owns the shop schema and its migrations; the admin binary
//! connects to the same database for back-office CRUD.
//!
//! ## Tables
//!
//! - `user` / `user_password` - Customer authentication
//! - `category`, `brand`, `product` - Catalog
//! - `customer_order` / `order_item` - Orders
//! - `counter` - Per-month reference-number sequences
//! - `invoice` - One-time and period invoices
//! - `newsletter_subscriber`
//! - `blog_post`, `content_section`, `gallery_image` - CMS content
//! - `vehicle`, `delivery_assignment` - Delivery fleet
//! - `payment_event` - Processed webhook transaction ids (idempotency)
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p jademart-cli -- migrate storefront
//! ```

pub mod catalog;
pub mod content;
pub mod counters;
pub mod newsletter;
pub mod orders;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::CatalogRepository;
pub use content::ContentRepository;
pub use counters::CounterRepository;
pub use newsletter::NewsletterRepository;
pub use orders::OrderRepository;
pub use users::UserRepository;

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

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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
