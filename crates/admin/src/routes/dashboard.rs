//! Dashboard summary handler.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::DashboardRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// GET /dashboard
#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Value>> {
    let repo = DashboardRepository::new(state.shop_pool());
    let summary = repo.summary().await?;

    Ok(Json(json!({ "dashboard": summary })))
}
