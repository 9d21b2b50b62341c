//! HTTP route handlers for the admin JSON API.
//!
//! Every mutating endpoint requires a role with write access; admin-user
//! management requires the super admin role; viewers can read everything.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//! GET    /health/ready                    - Both-database connectivity check
//!
//! # Auth
//! POST   /auth/login
//! POST   /auth/logout
//! GET    /auth/me
//!
//! # Admin users (super admin)
//! GET    /admin-users
//! POST   /admin-users
//! PATCH  /admin-users/{id}                - Role and/or active flag
//! DELETE /admin-users/{id}                - Not yourself
//!
//! # Catalog
//! GET    /products                        GET    /products/{id}
//! POST   /products                        PUT    /products/{id}
//! DELETE /products/{id}                   (soft delete)
//! GET/POST /categories, PUT/DELETE /categories/{id}
//! GET/POST /brands,     PUT/DELETE /brands/{id}
//!
//! # Orders
//! GET    /orders                          - status/payment/search filters
//! GET    /orders/{id}                     - With line items
//! PATCH  /orders/{id}/status              - Validated lifecycle transition
//! POST   /orders/{id}/mark-paid           - Offline payment confirmation
//! GET    /orders/{id}/print               - Printable HTML
//!
//! # Invoices
//! POST   /invoices                        - One-time invoice for an order
//! POST   /invoices/period                 - Aggregate a customer's paid orders
//! GET    /invoices                        GET    /invoices/{id}
//! POST   /invoices/{id}/mark-paid         POST   /invoices/{id}/send
//! POST   /invoices/overdue-sweep          - Flip pending past-due to overdue
//! GET    /invoices/{id}/print             - Printable HTML
//!
//! # Logistics
//! GET    /logistics/vehicles              POST   /logistics/vehicles
//! GET    /logistics/vehicles/{id}         PUT    /logistics/vehicles/{id}
//! PATCH  /logistics/vehicles/{id}/status  DELETE /logistics/vehicles/{id}
//! GET    /logistics/assignments?active=   POST   /logistics/assignments
//! POST   /logistics/assignments/{id}/complete
//!
//! # Newsletter
//! GET    /newsletter/subscribers          DELETE /newsletter/subscribers/{id}
//! GET    /newsletter/subscribers/export   - CSV
//!
//! # Blog & content
//! GET/POST /blog/posts, GET/PUT/DELETE /blog/posts/{id}
//! GET/POST /content/sections, PUT/DELETE /content/sections/{id}
//! GET    /gallery                         PUT    /gallery (atomic replace)
//! POST   /gallery/upload                  - Multipart, delegated to asset host
//!
//! # Dashboard
//! GET    /dashboard
//! ```

pub mod auth;
pub mod admin_users;
pub mod blog;
pub mod catalog;
pub mod content;
pub mod dashboard;
pub mod invoices;
pub mod logistics;
pub mod newsletter;
pub mod orders;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};
use serde_json::{Value, json};

use crate::state::AppState;

/// Default page size for list endpoints.
pub(crate) const DEFAULT_PAGE_SIZE: i64 = 25;

/// Maximum page size for list endpoints.
pub(crate) const MAX_PAGE_SIZE: i64 = 100;

/// Common pagination query parameters.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct Pagination {
    page: Option<i64>,
    per_page: Option<i64>,
}

impl Pagination {
    /// Clamp to sane bounds and convert to `(limit, offset, page, per_page)`.
    pub fn resolve(&self) -> (i64, i64, i64, i64) {
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let page = self.page.unwrap_or(1).max(1);
        (per_page, (page - 1) * per_page, page, per_page)
    }
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(health_ready))
        .nest("/auth", auth_routes())
        .nest("/admin-users", admin_user_routes())
        .merge(catalog_routes())
        .nest("/orders", order_routes())
        .nest("/invoices", invoice_routes())
        .nest("/logistics", logistics_routes())
        .nest("/newsletter", newsletter_routes())
        .merge(content_routes())
        .route("/dashboard", get(dashboard::summary))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

fn admin_user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin_users::list).post(admin_users::create))
        .route(
            "/{id}",
            patch(admin_users::update).delete(admin_users::remove),
        )
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(catalog::list_products).post(catalog::create_product))
        .route(
            "/products/{id}",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/categories/{id}",
            put(catalog::update_category).delete(catalog::delete_category),
        )
        .route("/brands", get(catalog::list_brands).post(catalog::create_brand))
        .route(
            "/brands/{id}",
            put(catalog::update_brand).delete(catalog::delete_brand),
        )
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/{id}", get(orders::get))
        .route("/{id}/status", patch(orders::transition_status))
        .route("/{id}/mark-paid", post(orders::mark_paid))
        .route("/{id}/print", get(orders::print))
}

fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(invoices::list).post(invoices::create_for_order))
        .route("/period", post(invoices::create_period))
        .route("/overdue-sweep", post(invoices::overdue_sweep))
        .route("/{id}", get(invoices::get))
        .route("/{id}/mark-paid", post(invoices::mark_paid))
        .route("/{id}/send", post(invoices::send))
        .route("/{id}/print", get(invoices::print))
}

fn logistics_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/vehicles",
            get(logistics::list_vehicles).post(logistics::create_vehicle),
        )
        .route(
            "/vehicles/{id}",
            get(logistics::get_vehicle)
                .put(logistics::update_vehicle)
                .delete(logistics::delete_vehicle),
        )
        .route("/vehicles/{id}/status", patch(logistics::set_vehicle_status))
        .route(
            "/assignments",
            get(logistics::list_assignments).post(logistics::assign),
        )
        .route("/assignments/{id}/complete", post(logistics::complete))
}

fn newsletter_routes() -> Router<AppState> {
    Router::new()
        .route("/subscribers", get(newsletter::list))
        .route("/subscribers/export", get(newsletter::export_csv))
        .route("/subscribers/{id}", delete(newsletter::remove))
}

fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/blog/posts", get(blog::list).post(blog::create))
        .route(
            "/blog/posts/{id}",
            get(blog::get).put(blog::update).delete(blog::remove),
        )
        .route(
            "/content/sections",
            get(content::list_sections).post(content::create_section),
        )
        .route(
            "/content/sections/{id}",
            put(content::update_section).delete(content::delete_section),
        )
        .route(
            "/gallery",
            get(content::list_gallery).put(content::replace_gallery),
        )
        .route("/gallery/upload", post(content::upload))
}

/// GET /health - liveness.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /health/ready - connectivity to both databases.
async fn health_ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let admin_ok = sqlx::query("SELECT 1").execute(state.admin_pool()).await;
    let shop_ok = sqlx::query("SELECT 1").execute(state.shop_pool()).await;

    match (admin_ok, shop_ok) {
        (Ok(_), Ok(_)) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        (admin, shop) => {
            if let Err(e) = &admin {
                tracing::error!(error = %e, "admin database health check failed");
            }
            if let Err(e) = &shop {
                tracing::error!(error = %e, "shop database health check failed");
            }
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
