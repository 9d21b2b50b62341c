//! Catalog repository: published products, categories, brands.
//!
//! The storefront only ever sees published, non-deleted rows; draft and
//! soft-deleted entries are back-office concerns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use jademart_core::{BrandId, CategoryId, LocalizedText, Price, ProductId};

use super::RepositoryError;
use crate::models::catalog::{Brand, Category, Product, ProductFilter, ProductSort};

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    slug: String,
    name_en: String,
    name_zh: String,
    description_en: String,
    description_zh: String,
    price: Decimal,
    stock: i32,
    category_id: Option<i32>,
    brand_id: Option<i32>,
    images: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let price = Price::new(self.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Product {
            id: ProductId::new(self.id),
            slug: self.slug,
            name: LocalizedText::new(self.name_en, self.name_zh),
            description: LocalizedText::new(self.description_en, self.description_zh),
            price,
            stock: self.stock,
            category_id: self.category_id.map(CategoryId::new),
            brand_id: self.brand_id.map(BrandId::new),
            images: self.images,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TaxonRow {
    id: i32,
    slug: String,
    name_en: String,
    name_zh: String,
}

const PRODUCT_COLUMNS: &str = "p.id, p.slug, p.name_en, p.name_zh, \
     p.description_en, p.description_zh, p.price, p.stock, \
     p.category_id, p.brand_id, p.images, p.created_at, p.updated_at";

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List published products matching the filter, plus the total match
    /// count for pagination.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if a stored price is invalid.
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product p"
        ));
        push_product_filter(&mut query, filter);

        match filter.sort {
            ProductSort::Newest => query.push(" ORDER BY p.created_at DESC, p.id DESC"),
            ProductSort::PriceAsc => query.push(" ORDER BY p.price ASC, p.id ASC"),
            ProductSort::PriceDesc => query.push(" ORDER BY p.price DESC, p.id ASC"),
        };

        query.push(" LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.offset);

        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(self.pool).await?;

        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM shop.product p");
        push_product_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let products = rows
            .into_iter()
            .map(ProductRow::into_product)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((products, total))
    }

    /// Get a published product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product p
            WHERE p.slug = $1 AND p.published AND p.deleted_at IS NULL
            "
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Load published products by ID, in no particular order.
    ///
    /// Used by cart display and checkout repricing; missing or unpublished
    /// IDs are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product p
            WHERE p.id = ANY($1) AND p.published AND p.deleted_at IS NULL
            "
        ))
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// List all categories, alphabetical by English name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaxonRow>(
            r"
            SELECT id, slug, name_en, name_zh
            FROM shop.category
            WHERE deleted_at IS NULL
            ORDER BY name_en ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Category {
                id: CategoryId::new(r.id),
                slug: r.slug,
                name: LocalizedText::new(r.name_en, r.name_zh),
            })
            .collect())
    }

    /// List all brands, alphabetical by English name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_brands(&self) -> Result<Vec<Brand>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaxonRow>(
            r"
            SELECT id, slug, name_en, name_zh
            FROM shop.brand
            WHERE deleted_at IS NULL
            ORDER BY name_en ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Brand {
                id: BrandId::new(r.id),
                slug: r.slug,
                name: LocalizedText::new(r.name_en, r.name_zh),
            })
            .collect())
    }
}

/// Append the shared WHERE clause for product listing and counting.
fn push_product_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    query.push(" WHERE p.published AND p.deleted_at IS NULL");

    if let Some(category) = &filter.category {
        query.push(
            " AND p.category_id = (SELECT id FROM shop.category WHERE slug = ",
        );
        query.push_bind(category.clone());
        query.push(")");
    }

    if let Some(brand) = &filter.brand {
        query.push(" AND p.brand_id = (SELECT id FROM shop.brand WHERE slug = ");
        query.push_bind(brand.clone());
        query.push(")");
    }

    if let Some(q) = &filter.query {
        // escape wildcards so user input is matched literally
        let mut pattern = String::with_capacity(q.len() + 2);
        pattern.push('%');
        for c in q.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        query.push(" AND (p.name_en ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR p.name_zh ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
}
