//! Integration tests for the admin back office: auth, catalog management,
//! order handling, and the dashboard.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The admin server running (cargo run -p jademart-admin)
//! - A super admin account, with credentials in `ADMIN_TEST_EMAIL` /
//!   `ADMIN_TEST_PASSWORD`
//!
//! Run with: cargo test -p jademart-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use jademart_integration_tests::{admin_base_url, admin_client, http_client, unique_email};

// ============================================================================
// Auth & roles
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_unauthenticated_requests_are_rejected() {
    let client = http_client();
    let base_url = admin_base_url();

    for path in ["/products", "/orders", "/dashboard", "/admin-users"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to reach admin endpoint");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "path: {path}");
        let body: Value = resp.json().await.expect("Invalid JSON");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
#[ignore = "Requires running admin server and test credentials"]
async fn test_login_logout_cycle() {
    let client = admin_client().await;
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/auth/me"))
        .send()
        .await
        .expect("Failed to fetch admin profile");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("Failed to logout");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/auth/me"))
        .send()
        .await
        .expect("Failed to fetch admin profile");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server and super admin credentials"]
async fn test_viewer_cannot_write() {
    let super_client = admin_client().await;
    let base_url = admin_base_url();

    // Create a viewer account
    let email = unique_email("viewer");
    let password = "a sufficiently long password";
    let resp = super_client
        .post(format!("{base_url}/admin-users"))
        .json(&json!({
            "email": email,
            "name": "Read Only",
            "role": "viewer",
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to create viewer");
    assert_eq!(resp.status(), StatusCode::OK);

    // Log in as the viewer
    let viewer = http_client();
    let resp = viewer
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to login as viewer");
    assert_eq!(resp.status(), StatusCode::OK);

    // Reads are fine
    let resp = viewer
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);

    // Writes are forbidden
    let resp = viewer
        .post(format!("{base_url}/categories"))
        .json(&json!({
            "slug": "viewer-category",
            "name": { "en": "Nope", "zh-TW": "不行" },
        }))
        .send()
        .await
        .expect("Failed to reach category create");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Admin-user management requires super admin
    let resp = viewer
        .get(format!("{base_url}/admin-users"))
        .send()
        .await
        .expect("Failed to reach admin-users");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Catalog management
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and test credentials"]
async fn test_product_crud_roundtrip() {
    let client = admin_client().await;
    let base_url = admin_base_url();
    let slug = format!("test-{}", uuid::Uuid::new_v4().simple());

    // Create
    let resp = client
        .post(format!("{base_url}/products"))
        .json(&json!({
            "slug": slug,
            "name": { "en": "Test Product", "zh-TW": "測試商品" },
            "description": { "en": "A test.", "zh-TW": "測試。" },
            "price": "199.00",
            "stock": 5,
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    let id = body["product"]["id"].as_i64().expect("product id");
    assert_eq!(body["product"]["published"], false);

    // Duplicate slug conflicts
    let resp = client
        .post(format!("{base_url}/products"))
        .json(&json!({
            "slug": slug,
            "name": { "en": "Test Product", "zh-TW": "測試商品" },
            "price": "199.00",
            "stock": 5,
        }))
        .send()
        .await
        .expect("Failed to reach product create");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Update (publish)
    let resp = client
        .put(format!("{base_url}/products/{id}"))
        .json(&json!({
            "slug": slug,
            "name": { "en": "Test Product v2", "zh-TW": "測試商品二" },
            "price": "249.00",
            "stock": 3,
            "published": true,
        }))
        .send()
        .await
        .expect("Failed to update product");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["product"]["published"], true);
    assert_eq!(body["product"]["name"]["en"], "Test Product v2");

    // Soft delete
    let resp = client
        .delete(format!("{base_url}/products/{id}"))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/products/{id}"))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running admin server and test credentials"]
async fn test_bad_slug_is_rejected() {
    let client = admin_client().await;
    let resp = client
        .post(format!("{}/categories", admin_base_url()))
        .json(&json!({
            "slug": "Not A Slug!",
            "name": { "en": "Bad", "zh-TW": "壞" },
        }))
        .send()
        .await
        .expect("Failed to reach category create");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and test credentials"]
async fn test_dashboard_summary_shape() {
    let client = admin_client().await;
    let resp = client
        .get(format!("{}/dashboard", admin_base_url()))
        .send()
        .await
        .expect("Failed to fetch dashboard");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Invalid JSON");
    let dashboard = &body["dashboard"];
    for key in [
        "pending_orders",
        "orders_this_month",
        "published_products",
        "overdue_invoices",
        "active_subscribers",
        "vehicles_available",
    ] {
        assert!(dashboard[key].is_number(), "missing dashboard key {key}");
    }
}
