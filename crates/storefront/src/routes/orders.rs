//! Customer order route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::state::AppState;

/// GET /orders
///
/// The logged-in customer's orders, newest first.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list_for_user(user.id).await?;

    Ok(Json(json!({ "orders": orders })))
}

/// GET /orders/{reference}
///
/// One of the customer's orders, with items and delivery tracking.
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(reference): Path<String>,
) -> Result<Json<Value>> {
    let repo = OrderRepository::new(state.pool());
    let detail = repo
        .get_detail_for_user(user.id, &reference)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order '{reference}'")))?;

    Ok(Json(json!({ "order": detail })))
}
