//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Database connectivity check
//!
//! # Auth
//! POST /auth/register           - Create an account (logs in)
//! POST /auth/login              - Login
//! POST /auth/logout             - Logout
//! GET  /auth/me                 - Current user profile
//!
//! # Catalog
//! GET  /products                - Product listing (filter/search/sort/page)
//! GET  /products/{slug}         - Product detail
//! GET  /categories              - Category list
//! GET  /brands                  - Brand list
//!
//! # Cart (session)
//! GET  /cart                    - Cart with live prices
//! POST /cart/add                - Add a product
//! POST /cart/update             - Set a line quantity
//! POST /cart/remove             - Remove a line
//!
//! # Orders
//! POST /checkout                - Place an order from the cart
//! GET  /orders                  - Own orders
//! GET  /orders/{reference}      - Own order detail with tracking
//!
//! # Newsletter
//! POST /newsletter/subscribe
//! GET  /newsletter/unsubscribe/{token}
//!
//! # Content
//! GET  /blog                    - Published posts
//! GET  /blog/{slug}             - Post detail (rendered HTML)
//! GET  /content/sections        - Hero/feature/guarantee sections
//! GET  /content/gallery         - Homepage gallery
//!
//! # Webhooks
//! POST /webhooks/payment        - Gateway callbacks (HMAC-signed) and the
//!                                 email provider's unsigned event feed
//! ```

pub mod auth;
pub mod blog;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod newsletter;
pub mod orders;
pub mod webhooks;

use axum::{
    Json,
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router (strictly rate limited).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .layer(auth_rate_limiter())
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(catalog::list_products))
        .route("/products/{slug}", get(catalog::get_product))
        .route("/categories", get(catalog::list_categories))
        .route("/brands", get(catalog::list_brands))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/{reference}", get(orders::get))
}

/// Create the content routes router.
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/sections", get(content::list_sections))
        .route("/gallery", get(content::list_gallery))
}

/// Create the webhook routes router.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/payment", post(webhooks::payment))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(health_ready))
        .merge(catalog_routes())
        .nest("/auth", auth_routes())
        .nest(
            "/cart",
            cart_routes().layer(api_rate_limiter()),
        )
        .route(
            "/checkout",
            post(checkout::checkout).layer(api_rate_limiter()),
        )
        .nest("/orders", order_routes())
        .route(
            "/newsletter/subscribe",
            post(newsletter::subscribe).layer(api_rate_limiter()),
        )
        .route(
            "/newsletter/unsubscribe/{token}",
            get(newsletter::unsubscribe),
        )
        .route("/blog", get(blog::list_posts))
        .route("/blog/{slug}", get(blog::get_post))
        .nest("/content", content_routes())
        .nest("/webhooks", webhook_routes())
}

/// GET /health - liveness.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /health/ready - database connectivity.
async fn health_ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!(error = %e, "database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
