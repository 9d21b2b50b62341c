//! Catalog domain types: products, categories, brands.

use chrono::{DateTime, Utc};
use serde::Serialize;

use jademart_core::{BrandId, CategoryId, LocalizedText, Price, ProductId};

/// A published product as served to the storefront.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// URL slug, unique across products.
    pub slug: String,
    /// Localized display name.
    pub name: LocalizedText,
    /// Localized long description.
    pub description: LocalizedText,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub stock: i32,
    /// Category reference, if categorized.
    pub category_id: Option<CategoryId>,
    /// Brand reference, if branded.
    pub brand_id: Option<BrandId>,
    /// Hosted image URLs, in display order.
    pub images: Vec<String>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A product category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub name: LocalizedText,
}

/// A product brand.
#[derive(Debug, Clone, Serialize)]
pub struct Brand {
    pub id: BrandId,
    pub slug: String,
    pub name: LocalizedText,
}

/// Sort orders accepted by the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

/// Filter criteria for the public product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Category slug.
    pub category: Option<String>,
    /// Brand slug.
    pub brand: Option<String>,
    /// Free-text search over both name locales.
    pub query: Option<String>,
    /// Sort order.
    pub sort: ProductSort,
    /// Page size (bounded by the route handler).
    pub limit: i64,
    /// Rows to skip.
    pub offset: i64,
}
