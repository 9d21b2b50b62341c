//! Public catalog route handlers.
//!
//! Listing responses are cached briefly (see `AppState::read_cache`) since
//! the catalog changes far less often than it is read.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::db::CatalogRepository;
use crate::models::catalog::{ProductFilter, ProductSort};
use crate::state::AppState;

/// Default page size for product listings.
const DEFAULT_PAGE_SIZE: i64 = 24;

/// Maximum page size a client may request.
const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Free-text search over product names.
    pub q: Option<String>,
    pub sort: Option<ProductSort>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// GET /products
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Value>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let filter = ProductFilter {
        category: query.category.filter(|s| !s.is_empty()),
        brand: query.brand.filter(|s| !s.is_empty()),
        query: query.q.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty()),
        sort: query.sort.unwrap_or_default(),
        limit: per_page,
        offset: (page - 1) * per_page,
    };

    let cache_key = format!(
        "products:{:?}:{:?}:{:?}:{:?}:{page}:{per_page}",
        filter.category, filter.brand, filter.query, filter.sort
    );
    if let Some(cached) = state.read_cache().get(&cache_key).await {
        return Ok(Json(cached));
    }

    let repo = CatalogRepository::new(state.pool());
    let (products, total) = repo.list_products(&filter).await?;

    let body = json!({
        "products": products,
        "page": page,
        "per_page": per_page,
        "total": total,
    });
    state.read_cache().insert(cache_key, body.clone()).await;

    Ok(Json(body))
}

/// GET /products/{slug}
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let repo = CatalogRepository::new(state.pool());
    let product = repo
        .get_product_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product '{slug}'")))?;

    Ok(Json(json!({ "product": product })))
}

/// GET /categories
#[instrument(skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Value>> {
    let cache_key = "categories".to_owned();
    if let Some(cached) = state.read_cache().get(&cache_key).await {
        return Ok(Json(cached));
    }

    let repo = CatalogRepository::new(state.pool());
    let categories = repo.list_categories().await?;

    let body = json!({ "categories": categories });
    state.read_cache().insert(cache_key, body.clone()).await;

    Ok(Json(body))
}

/// GET /brands
#[instrument(skip(state))]
pub async fn list_brands(State(state): State<AppState>) -> Result<Json<Value>> {
    let cache_key = "brands".to_owned();
    if let Some(cached) = state.read_cache().get(&cache_key).await {
        return Ok(Json(cached));
    }

    let repo = CatalogRepository::new(state.pool());
    let brands = repo.list_brands().await?;

    let body = json!({ "brands": brands });
    state.read_cache().insert(cache_key, body.clone()).await;

    Ok(Json(body))
}
