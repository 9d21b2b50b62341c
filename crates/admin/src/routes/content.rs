//! Site content handlers: homepage sections, the gallery, and image upload.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use jademart_core::SectionId;

use crate::db::ContentRepository;
use crate::error::{AdminError, Result};
use crate::middleware::{RequireAdmin, RequireWriteAccess};
use crate::models::content::{GalleryInput, SectionInput};
use crate::services::assets::AssetError;
use crate::state::AppState;

/// Upload size cap, enforced before the asset host sees the file.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Section kinds the storefront knows how to render.
const SECTION_KINDS: &[&str] = &["hero", "feature", "guarantee"];

fn validate_section_input(input: &SectionInput) -> Result<()> {
    if !SECTION_KINDS.contains(&input.kind.as_str()) {
        return Err(AdminError::BadRequest(format!(
            "section kind must be one of: {}",
            SECTION_KINDS.join(", ")
        )));
    }
    if input.title.is_empty() && input.body.is_empty() {
        return Err(AdminError::BadRequest(
            "section needs a title or body".to_string(),
        ));
    }
    Ok(())
}

/// GET /content/sections
#[instrument(skip(state))]
pub async fn list_sections(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Value>> {
    let repo = ContentRepository::new(state.shop_pool());
    let sections = repo.list_sections().await?;

    Ok(Json(json!({ "sections": sections })))
}

/// POST /content/sections
#[instrument(skip(state, input))]
pub async fn create_section(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Json(input): Json<SectionInput>,
) -> Result<Json<Value>> {
    validate_section_input(&input)?;

    let repo = ContentRepository::new(state.shop_pool());
    let section = repo.create_section(&input).await?;

    Ok(Json(json!({ "section": section })))
}

/// PUT /content/sections/{id}
#[instrument(skip(state, input))]
pub async fn update_section(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
    Json(input): Json<SectionInput>,
) -> Result<Json<Value>> {
    validate_section_input(&input)?;

    let repo = ContentRepository::new(state.shop_pool());
    let section = repo.update_section(SectionId::new(id), &input).await?;

    Ok(Json(json!({ "section": section })))
}

/// DELETE /content/sections/{id}
#[instrument(skip(state))]
pub async fn delete_section(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = ContentRepository::new(state.shop_pool());
    repo.delete_section(SectionId::new(id)).await?;

    Ok(Json(json!({ "ok": true })))
}

/// GET /gallery
#[instrument(skip(state))]
pub async fn list_gallery(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Value>> {
    let repo = ContentRepository::new(state.shop_pool());
    let images = repo.list_gallery().await?;

    Ok(Json(json!({ "images": images })))
}

/// PUT /gallery
///
/// Replaces the whole gallery atomically; the payload order becomes the
/// display order.
#[instrument(skip(state, input))]
pub async fn replace_gallery(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Json(input): Json<GalleryInput>,
) -> Result<Json<Value>> {
    for image in &input.images {
        if image.url.trim().is_empty() {
            return Err(AdminError::BadRequest("image url cannot be empty".to_string()));
        }
    }

    let repo = ContentRepository::new(state.shop_pool());
    let images = repo.replace_gallery(&input.images).await?;

    tracing::info!(count = images.len(), "gallery replaced");

    Ok(Json(json!({ "images": images })))
}

/// POST /gallery/upload
///
/// Accepts a multipart `file` part and forwards it to the asset host.
#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let Some(assets) = state.assets() else {
        return Err(AdminError::Internal(
            "asset host is not configured".to_string(),
        ));
    };

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AdminError::BadRequest(format!("malformed multipart body: {e}")))?
        .ok_or_else(|| AdminError::BadRequest("missing file field".to_string()))?;

    if field.name() != Some("file") {
        return Err(AdminError::BadRequest(
            "expected a single \"file\" field".to_string(),
        ));
    }

    let content_type = field
        .content_type()
        .map(ToString::to_string)
        .ok_or_else(|| AdminError::BadRequest("file content type is required".to_string()))?;
    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(AdminError::BadRequest(format!(
            "unsupported image type {content_type}"
        )));
    }

    let filename = field
        .file_name()
        .map_or_else(|| "upload".to_string(), ToString::to_string);

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AdminError::BadRequest(format!("failed to read upload: {e}")))?;
    if bytes.is_empty() {
        return Err(AdminError::BadRequest("uploaded file is empty".to_string()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AdminError::BadRequest(format!(
            "file exceeds the {}MB upload limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }

    let stored = assets
        .upload(&filename, &content_type, bytes.to_vec())
        .await
        .map_err(|e| match e {
            AssetError::Rejected { status, message } => {
                AdminError::BadRequest(format!("asset host rejected the file ({status}): {message}"))
            }
            other => AdminError::Internal(format!("asset upload failed: {other}")),
        })?;

    tracing::info!(url = %stored.url, "image uploaded");

    Ok(Json(json!({ "url": stored.url })))
}
