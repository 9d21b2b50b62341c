//! Managed content route handlers: page sections and the gallery.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::ContentRepository;
use crate::error::Result;
use crate::models::content::SectionKind;
use crate::state::AppState;

/// Query parameters for the sections listing.
#[derive(Debug, Deserialize)]
pub struct SectionsQuery {
    pub kind: Option<SectionKind>,
}

/// GET /content/sections
#[instrument(skip(state))]
pub async fn list_sections(
    State(state): State<AppState>,
    Query(query): Query<SectionsQuery>,
) -> Result<Json<Value>> {
    let cache_key = format!("sections:{:?}", query.kind);
    if let Some(cached) = state.read_cache().get(&cache_key).await {
        return Ok(Json(cached));
    }

    let repo = ContentRepository::new(state.pool());
    let sections = repo.list_sections(query.kind).await?;

    let body = json!({ "sections": sections });
    state.read_cache().insert(cache_key, body.clone()).await;

    Ok(Json(body))
}

/// GET /content/gallery
#[instrument(skip(state))]
pub async fn list_gallery(State(state): State<AppState>) -> Result<Json<Value>> {
    let cache_key = "gallery".to_owned();
    if let Some(cached) = state.read_cache().get(&cache_key).await {
        return Ok(Json(cached));
    }

    let repo = ContentRepository::new(state.pool());
    let gallery = repo.list_gallery().await?;

    let body = json!({ "gallery": gallery });
    state.read_cache().insert(cache_key, body.clone()).await;

    Ok(Json(body))
}
