//! Blog route handlers.
//!
//! Post bodies are stored as Markdown and rendered to HTML here with
//! comrak, with raw HTML escaped.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use comrak::{Options, markdown_to_html};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::ContentRepository;
use crate::error::{AppError, Result};
use crate::models::content::BlogPost;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 50;

/// Query parameters for the post listing.
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// GET /blog
#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Value>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let cache_key = format!("blog:{page}:{per_page}");
    if let Some(cached) = state.read_cache().get(&cache_key).await {
        return Ok(Json(cached));
    }

    let repo = ContentRepository::new(state.pool());
    let (posts, total) = repo.list_posts(per_page, (page - 1) * per_page).await?;

    let body = json!({
        "posts": posts,
        "page": page,
        "per_page": per_page,
        "total": total,
    });
    state.read_cache().insert(cache_key, body.clone()).await;

    Ok(Json(body))
}

/// GET /blog/{slug}
#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let repo = ContentRepository::new(state.pool());
    let source = repo
        .get_post_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post '{slug}'")))?;

    let post = BlogPost {
        id: source.id,
        slug: source.slug,
        title: source.title,
        excerpt: source.excerpt,
        body_html: render_markdown(&source.body_markdown),
        cover_image: source.cover_image,
        published_at: source.published_at,
    };

    Ok(Json(json!({ "post": post })))
}

/// Render Markdown to HTML with raw HTML escaped.
fn render_markdown(markdown: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.render.escape = true;

    markdown_to_html(markdown, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markdown_basics() {
        let html = render_markdown("# Title\n\nSome *emphasis*.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn test_render_markdown_escapes_raw_html() {
        let html = render_markdown("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }
}
