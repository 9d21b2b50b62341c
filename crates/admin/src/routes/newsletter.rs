//! Newsletter subscriber handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use jademart_core::SubscriberId;

use crate::db::NewsletterRepository;
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireWriteAccess};
use crate::state::AppState;

use super::Pagination;

/// Query parameters for the subscriber list.
#[derive(Debug, Deserialize)]
pub struct ListSubscribersQuery {
    #[serde(default)]
    pub active_only: bool,
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// GET /newsletter/subscribers
#[instrument(skip(state, query))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<ListSubscribersQuery>,
) -> Result<Json<Value>> {
    let (limit, offset, page, per_page) = query.pagination.resolve();

    let repo = NewsletterRepository::new(state.shop_pool());
    let (subscribers, total) = repo.list(query.active_only, limit, offset).await?;

    Ok(Json(json!({
        "subscribers": subscribers,
        "page": page,
        "per_page": per_page,
        "total": total,
    })))
}

/// GET /newsletter/export
///
/// Active subscribers as a CSV download, oldest first.
#[instrument(skip(state))]
pub async fn export_csv(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Response> {
    let repo = NewsletterRepository::new(state.shop_pool());
    let subscribers = repo.export_active().await?;

    let mut csv = String::from("email,subscribed_at\n");
    for subscriber in &subscribers {
        csv.push_str(&format!(
            "{},{}\n",
            escape_csv_field(&subscriber.email),
            subscriber.subscribed_at.format("%Y-%m-%dT%H:%M:%SZ")
        ));
    }

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"subscribers.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// DELETE /newsletter/subscribers/{id}
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = NewsletterRepository::new(state.shop_pool());
    repo.deactivate(SubscriberId::new(id)).await?;

    Ok(Json(json!({ "ok": true })))
}

/// Quote a CSV field if it contains a delimiter, quote, or newline.
fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("plain@example.com"), "plain@example.com");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
