//! Integration tests for the storefront shop flow: registration, catalog
//! browsing, the session cart, and checkout.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p jademart-storefront)
//! - A seeded catalog (jm-cli seed)
//!
//! Run with: cargo test -p jademart-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use jademart_integration_tests::{gateway_signature, http_client, storefront_base_url, unique_email};

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health_endpoints() {
    let client = http_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach health endpoint");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach readiness endpoint");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_register_login_me_roundtrip() {
    let client = http_client();
    let base_url = storefront_base_url();
    let email = unique_email("shopper");

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({
            "email": email,
            "name": "Test Shopper",
            "password": "a long enough password",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::OK);

    // Registration logs in; /auth/me should know us
    let resp = client
        .get(format!("{base_url}/auth/me"))
        .send()
        .await
        .expect("Failed to fetch profile");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["user"]["email"], email.as_str());

    // Duplicate registration is rejected with the JSON error shape
    let resp = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({
            "email": email,
            "name": "Test Shopper",
            "password": "a long enough password",
        }))
        .send()
        .await
        .expect("Failed to re-register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_me_requires_session() {
    let client = http_client();
    let resp = client
        .get(format!("{}/auth/me", storefront_base_url()))
        .send()
        .await
        .expect("Failed to reach /auth/me");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_product_listing_and_detail() {
    let client = http_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    let products = body["products"].as_array().expect("products array");
    assert!(!products.is_empty(), "seeded catalog expected");

    let slug = products[0]["slug"].as_str().expect("product slug");
    let resp = client
        .get(format!("{base_url}/products/{slug}"))
        .send()
        .await
        .expect("Failed to fetch product detail");
    assert_eq!(resp.status(), StatusCode::OK);

    // Names carry both languages
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert!(body["product"]["name"]["en"].is_string());
    assert!(body["product"]["name"]["zh-TW"].is_string());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_product_is_404() {
    let client = http_client();
    let resp = client
        .get(format!(
            "{}/products/definitely-not-a-product",
            storefront_base_url()
        ))
        .send()
        .await
        .expect("Failed to reach product detail");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Cart & checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_cart_checkout_flow() {
    let client = http_client();
    let base_url = storefront_base_url();

    // Log in
    let email = unique_email("buyer");
    let resp = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({
            "email": email,
            "name": "Test Buyer",
            "password": "a long enough password",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::OK);

    // Find a product
    let resp = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to list products");
    let body: Value = resp.json().await.expect("Invalid JSON");
    let product_id = body["products"][0]["id"].as_i64().expect("product id");

    // Add to cart
    let resp = client
        .post(format!("{base_url}/cart/add"))
        .json(&json!({ "product_id": product_id, "quantity": 2 }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to fetch cart");
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));

    // Checkout with an offline method; the order starts pending/unpaid
    let resp = client
        .post(format!("{base_url}/checkout"))
        .json(&json!({
            "payment_method": "bank_transfer",
            "recipient": "Test Buyer",
            "phone": "0912345678",
            "address": "1 Demo Street, Taipei",
        }))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    let reference = body["order"]["reference"].as_str().expect("order reference");
    assert!(reference.starts_with("ORD-"), "reference: {reference}");
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["payment_status"], "unpaid");

    // The cart is cleared
    let resp = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to fetch cart");
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));

    // The order shows up in the customer's history
    let resp = client
        .get(format!("{base_url}/orders/{reference}"))
        .send()
        .await
        .expect("Failed to fetch order");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Payment webhook
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server, seeded catalog, and PAYMENT_GATEWAY_SECRET"]
async fn test_payment_webhook_replay_settles_order_once() {
    let client = http_client();
    let base_url = storefront_base_url();

    // Place an order to settle
    let email = unique_email("payer");
    let resp = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({
            "email": email,
            "name": "Test Payer",
            "password": "a long enough password",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to list products");
    let body: Value = resp.json().await.expect("Invalid JSON");
    let product_id = body["products"][0]["id"].as_i64().expect("product id");

    let resp = client
        .post(format!("{base_url}/cart/add"))
        .json(&json!({ "product_id": product_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/checkout"))
        .json(&json!({
            "payment_method": "bank_transfer",
            "recipient": "Test Payer",
            "phone": "0912345678",
            "address": "1 Demo Street, Taipei",
        }))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    let reference = body["order"]["reference"]
        .as_str()
        .expect("order reference")
        .to_owned();

    // The gateway confirms the payment
    let txn_id = format!("txn-{}", uuid::Uuid::new_v4().simple());
    let payload = json!({
        "event": "payment.succeeded",
        "data": { "order_reference": reference, "transaction_id": txn_id },
    })
    .to_string();
    let signature = gateway_signature(&payload);

    let resp = client
        .post(format!("{base_url}/webhooks/payment"))
        .header("x-gateway-signature", &signature)
        .header("content-type", "application/json")
        .body(payload.clone())
        .send()
        .await
        .expect("Failed to deliver webhook");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["received"], true);
    assert!(body.get("duplicate").is_none(), "first delivery flagged as duplicate");

    // A gateway retry with the same transaction ID is acknowledged
    // without writing anything twice
    let resp = client
        .post(format!("{base_url}/webhooks/payment"))
        .header("x-gateway-signature", &signature)
        .header("content-type", "application/json")
        .body(payload)
        .send()
        .await
        .expect("Failed to redeliver webhook");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["received"], true);
    assert_eq!(body["duplicate"], true);

    // The order settled exactly once: paid, and moved on to processing
    let resp = client
        .get(format!("{base_url}/orders/{reference}"))
        .send()
        .await
        .expect("Failed to fetch order");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["order"]["payment_status"], "paid");
    assert_eq!(body["order"]["status"], "processing");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_requires_login() {
    let client = http_client();
    let resp = client
        .post(format!("{}/checkout", storefront_base_url()))
        .json(&json!({
            "payment_method": "bank_transfer",
            "recipient": "Nobody",
            "phone": "0900000000",
            "address": "Nowhere",
        }))
        .send()
        .await
        .expect("Failed to reach checkout");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
