//! Integration tests for Jade Market.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the databases and run migrations
//! cargo run -p jademart-cli -- migrate all
//!
//! # Start both servers
//! cargo run -p jademart-storefront &
//! cargo run -p jademart-admin &
//!
//! # Run integration tests (they are #[ignore]d by default)
//! cargo test -p jademart-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - defaults to `http://localhost:3000`
//! - `ADMIN_BASE_URL` - defaults to `http://localhost:3001`
//! - `ADMIN_TEST_EMAIL` / `ADMIN_TEST_PASSWORD` - credentials for a
//!   super admin created via `jm-cli admin create`
//! - `PAYMENT_GATEWAY_SECRET` - same shared secret the storefront was
//!   started with (webhook tests sign their own callbacks)

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde_json::json;
use sha2::Sha256;

/// Base URL for the storefront API.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A cookie-keeping HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn http_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Log into the admin panel and return the authenticated client.
///
/// # Panics
///
/// Panics if credentials are missing from the environment or login fails.
pub async fn admin_client() -> Client {
    let email = std::env::var("ADMIN_TEST_EMAIL").expect("ADMIN_TEST_EMAIL not set");
    let password = std::env::var("ADMIN_TEST_PASSWORD").expect("ADMIN_TEST_PASSWORD not set");

    let client = http_client();
    let resp = client
        .post(format!("{}/auth/login", admin_base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to reach admin login");
    assert!(
        resp.status().is_success(),
        "admin login failed: {}",
        resp.status()
    );
    client
}

/// A unique email for test registrations.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Hex HMAC-SHA256 digest the payment gateway attaches to its callbacks.
///
/// Signs with the same `PAYMENT_GATEWAY_SECRET` the storefront under test
/// was started with.
///
/// # Panics
///
/// Panics if `PAYMENT_GATEWAY_SECRET` is not set.
#[must_use]
pub fn gateway_signature(body: &str) -> String {
    let secret = std::env::var("PAYMENT_GATEWAY_SECRET").expect("PAYMENT_GATEWAY_SECRET not set");
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
