//! Catalog domain types for the back office.
//!
//! Unlike the storefront views, these include drafts and publication state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jademart_core::{BrandId, CategoryId, LocalizedText, Price, ProductId};

/// A product as managed in the back office.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub price: Price,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub images: Vec<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub slug: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub price: Price,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

/// A category as managed in the back office.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub name: LocalizedText,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A brand as managed in the back office.
#[derive(Debug, Clone, Serialize)]
pub struct Brand {
    pub id: BrandId,
    pub slug: String,
    pub name: LocalizedText,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a category or brand.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonInput {
    pub slug: String,
    pub name: LocalizedText,
}
