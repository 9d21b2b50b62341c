//! Catalog management handlers: products, categories, brands.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use jademart_core::{BrandId, CategoryId, ProductId};

use crate::db::{BrandRepository, CategoryRepository, ProductRepository};
use crate::error::{AdminError, Result};
use crate::middleware::{RequireAdmin, RequireWriteAccess};
use crate::models::catalog::{ProductInput, TaxonInput};
use crate::state::AppState;

use super::Pagination;

pub(super) fn validate_slug(slug: &str) -> Result<()> {
    let ok = !slug.is_empty()
        && slug.len() <= 100
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if ok {
        Ok(())
    } else {
        Err(AdminError::BadRequest(
            "slug must be lowercase alphanumeric with hyphens".to_owned(),
        ))
    }
}

// ==================== products ====================

/// GET /products
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Value>> {
    let (limit, offset, page, per_page) = pagination.resolve();
    let repo = ProductRepository::new(state.shop_pool());
    let (products, total) = repo.list(limit, offset).await?;

    Ok(Json(json!({
        "products": products,
        "page": page,
        "per_page": per_page,
        "total": total,
    })))
}

/// GET /products/{id}
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = ProductRepository::new(state.shop_pool());
    let product = repo
        .get_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("product {id}")))?;

    Ok(Json(json!({ "product": product })))
}

/// POST /products
#[instrument(skip(state, input), fields(slug = %input.slug))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Json(input): Json<ProductInput>,
) -> Result<Json<Value>> {
    validate_slug(&input.slug)?;

    let repo = ProductRepository::new(state.shop_pool());
    let product = repo.create(&input).await?;

    tracing::info!(product_id = %product.id, "product created");

    Ok(Json(json!({ "product": product })))
}

/// PUT /products/{id}
#[instrument(skip(state, input))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Value>> {
    validate_slug(&input.slug)?;

    let repo = ProductRepository::new(state.shop_pool());
    let product = repo.update(ProductId::new(id), &input).await?;

    Ok(Json(json!({ "product": product })))
}

/// DELETE /products/{id}
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = ProductRepository::new(state.shop_pool());
    repo.soft_delete(ProductId::new(id)).await?;

    tracing::info!(product_id = %id, "product soft-deleted");

    Ok(Json(json!({ "ok": true })))
}

// ==================== categories ====================

/// GET /categories
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Value>> {
    let repo = CategoryRepository::new(state.shop_pool());
    let categories = repo.list().await?;

    Ok(Json(json!({ "categories": categories })))
}

/// POST /categories
#[instrument(skip(state, input), fields(slug = %input.slug))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Json(input): Json<TaxonInput>,
) -> Result<Json<Value>> {
    validate_slug(&input.slug)?;

    let repo = CategoryRepository::new(state.shop_pool());
    let category = repo.create(&input).await?;

    Ok(Json(json!({ "category": category })))
}

/// PUT /categories/{id}
#[instrument(skip(state, input))]
pub async fn update_category(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
    Json(input): Json<TaxonInput>,
) -> Result<Json<Value>> {
    validate_slug(&input.slug)?;

    let repo = CategoryRepository::new(state.shop_pool());
    let category = repo.update(CategoryId::new(id), &input).await?;

    Ok(Json(json!({ "category": category })))
}

/// DELETE /categories/{id}
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = CategoryRepository::new(state.shop_pool());
    repo.soft_delete(CategoryId::new(id)).await?;

    Ok(Json(json!({ "ok": true })))
}

// ==================== brands ====================

/// GET /brands
#[instrument(skip(state))]
pub async fn list_brands(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Value>> {
    let repo = BrandRepository::new(state.shop_pool());
    let brands = repo.list().await?;

    Ok(Json(json!({ "brands": brands })))
}

/// POST /brands
#[instrument(skip(state, input), fields(slug = %input.slug))]
pub async fn create_brand(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Json(input): Json<TaxonInput>,
) -> Result<Json<Value>> {
    validate_slug(&input.slug)?;

    let repo = BrandRepository::new(state.shop_pool());
    let brand = repo.create(&input).await?;

    Ok(Json(json!({ "brand": brand })))
}

/// PUT /brands/{id}
#[instrument(skip(state, input))]
pub async fn update_brand(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
    Json(input): Json<TaxonInput>,
) -> Result<Json<Value>> {
    validate_slug(&input.slug)?;

    let repo = BrandRepository::new(state.shop_pool());
    let brand = repo.update(BrandId::new(id), &input).await?;

    Ok(Json(json!({ "brand": brand })))
}

/// DELETE /brands/{id}
#[instrument(skip(state))]
pub async fn delete_brand(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = BrandRepository::new(state.shop_pool());
    repo.soft_delete(BrandId::new(id)).await?;

    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("oolong-tea-200g").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Has Spaces").is_err());
        assert!(validate_slug("UPPER").is_err());
        assert!(validate_slug("unicode-茶").is_err());
    }
}
