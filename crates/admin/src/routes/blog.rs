//! Blog post handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use jademart_core::PostId;

use crate::db::ContentRepository;
use crate::error::{AdminError, Result};
use crate::middleware::{RequireAdmin, RequireWriteAccess};
use crate::models::content::BlogPostInput;
use crate::state::AppState;

use super::Pagination;
use super::catalog::validate_slug;

fn validate_post_input(input: &BlogPostInput) -> Result<()> {
    validate_slug(&input.slug)?;
    if input.title.is_empty() {
        return Err(AdminError::BadRequest(
            "title is required in at least one language".to_string(),
        ));
    }
    if input.body_markdown.trim().is_empty() {
        return Err(AdminError::BadRequest("post body is required".to_string()));
    }
    Ok(())
}

/// GET /blog/posts
#[instrument(skip(state, pagination))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Value>> {
    let (limit, offset, page, per_page) = pagination.resolve();

    let repo = ContentRepository::new(state.shop_pool());
    let (posts, total) = repo.list_posts(limit, offset).await?;

    Ok(Json(json!({
        "posts": posts,
        "page": page,
        "per_page": per_page,
        "total": total,
    })))
}

/// POST /blog/posts
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Json(input): Json<BlogPostInput>,
) -> Result<Json<Value>> {
    validate_post_input(&input)?;

    let repo = ContentRepository::new(state.shop_pool());
    let post = repo.create_post(&input).await?;

    tracing::info!(slug = %post.slug, "blog post created");

    Ok(Json(json!({ "post": post })))
}

/// GET /blog/posts/{id}
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = ContentRepository::new(state.shop_pool());
    let post = repo
        .get_post(PostId::new(id))
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("post {id}")))?;

    Ok(Json(json!({ "post": post })))
}

/// PUT /blog/posts/{id}
#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
    Json(input): Json<BlogPostInput>,
) -> Result<Json<Value>> {
    validate_post_input(&input)?;

    let repo = ContentRepository::new(state.shop_pool());
    let post = repo.update_post(PostId::new(id), &input).await?;

    Ok(Json(json!({ "post": post })))
}

/// DELETE /blog/posts/{id}
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = ContentRepository::new(state.shop_pool());
    repo.soft_delete_post(PostId::new(id)).await?;

    Ok(Json(json!({ "ok": true })))
}
