//! Catalog repositories for the back office (shop database).
//!
//! Unlike the storefront reads, these see drafts and manage the full
//! lifecycle: create, update, publish, soft delete.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use jademart_core::{BrandId, CategoryId, LocalizedText, Price, ProductId};

use super::{RepositoryError, corrupt};
use crate::models::catalog::{Brand, Category, Product, ProductInput, TaxonInput};

/// Repository for product management.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

/// Repository for category management.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

/// Repository for brand management.
pub struct BrandRepository<'a> {
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
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        Ok(Product {
            id: ProductId::new(self.id),
            slug: self.slug,
            name: LocalizedText::new(self.name_en, self.name_zh),
            description: LocalizedText::new(self.description_en, self.description_zh),
            price: Price::new(self.price).map_err(|e| corrupt("price", e))?,
            stock: self.stock,
            category_id: self.category_id.map(CategoryId::new),
            brand_id: self.brand_id.map(BrandId::new),
            images: self.images,
            published: self.published,
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
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str = "id, slug, name_en, name_zh, description_en, description_zh, \
     price, stock, category_id, brand_id, images, published, created_at, updated_at";

const TAXON_COLUMNS: &str = "id, slug, name_en, name_zh, created_at, updated_at";

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, drafts included, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shop.product WHERE deleted_at IS NULL")
                .fetch_one(self.pool)
                .await?;

        let products = rows
            .into_iter()
            .map(ProductRow::into_product)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((products, total))
    }

    /// Get a product by ID, drafts included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken, and
    /// `RepositoryError::Database` for other failures.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO shop.product
                (slug, name_en, name_zh, description_en, description_zh,
                 price, stock, category_id, brand_id, images, published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&input.slug)
        .bind(&input.name.en)
        .bind(&input.name.zh_tw)
        .bind(&input.description.en)
        .bind(&input.description.zh_tw)
        .bind(input.price.amount())
        .bind(input.stock)
        .bind(input.category_id.map(|c| c.as_i32()))
        .bind(input.brand_id.map(|b| b.as_i32()))
        .bind(&input.images)
        .bind(input.published)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product slug already exists"))?;

        row.into_product()
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist,
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE shop.product
            SET slug = $2, name_en = $3, name_zh = $4,
                description_en = $5, description_zh = $6,
                price = $7, stock = $8, category_id = $9, brand_id = $10,
                images = $11, published = $12, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(&input.slug)
        .bind(&input.name.en)
        .bind(&input.name.zh_tw)
        .bind(&input.description.en)
        .bind(&input.description.zh_tw)
        .bind(input.price.amount())
        .bind(input.stock)
        .bind(input.category_id.map(|c| c.as_i32()))
        .bind(input.brand_id.map(|b| b.as_i32()))
        .bind(&input.images)
        .bind(input.published)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product slug already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        row.into_product()
    }

    /// Soft-delete a product. It disappears from all listings but stays
    /// referenced by historical order items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn soft_delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.product
            SET deleted_at = NOW(), published = FALSE, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories, alphabetical by English name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaxonRow>(&format!(
            r"
            SELECT {TAXON_COLUMNS} FROM shop.category
            WHERE deleted_at IS NULL
            ORDER BY name_en ASC
            "
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Category {
                id: CategoryId::new(r.id),
                slug: r.slug,
                name: LocalizedText::new(r.name_en, r.name_zh),
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect())
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, input: &TaxonInput) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, TaxonRow>(&format!(
            r"
            INSERT INTO shop.category (slug, name_en, name_zh)
            VALUES ($1, $2, $3)
            RETURNING {TAXON_COLUMNS}
            "
        ))
        .bind(&input.slug)
        .bind(&input.name.en)
        .bind(&input.name.zh_tw)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "category slug already exists"))?;

        Ok(Category {
            id: CategoryId::new(row.id),
            slug: row.slug,
            name: LocalizedText::new(row.name_en, row.name_zh),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Rename or re-slug a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist,
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        input: &TaxonInput,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, TaxonRow>(&format!(
            r"
            UPDATE shop.category
            SET slug = $2, name_en = $3, name_zh = $4, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {TAXON_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(&input.slug)
        .bind(&input.name.en)
        .bind(&input.name.zh_tw)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "category slug already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Category {
            id: CategoryId::new(row.id),
            slug: row.slug,
            name: LocalizedText::new(row.name_en, row.name_zh),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Soft-delete a category. Refused while any live product still
    /// references it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist,
    /// and `RepositoryError::Conflict` if products still use it.
    pub async fn soft_delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let in_use: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shop.product WHERE category_id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i32())
        .fetch_one(self.pool)
        .await?;

        if in_use > 0 {
            return Err(RepositoryError::Conflict(format!(
                "category is used by {in_use} products"
            )));
        }

        let result = sqlx::query(
            r"
            UPDATE shop.category
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl<'a> BrandRepository<'a> {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all brands, alphabetical by English name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Brand>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaxonRow>(&format!(
            r"
            SELECT {TAXON_COLUMNS} FROM shop.brand
            WHERE deleted_at IS NULL
            ORDER BY name_en ASC
            "
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Brand {
                id: BrandId::new(r.id),
                slug: r.slug,
                name: LocalizedText::new(r.name_en, r.name_zh),
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect())
    }

    /// Create a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, input: &TaxonInput) -> Result<Brand, RepositoryError> {
        let row = sqlx::query_as::<_, TaxonRow>(&format!(
            r"
            INSERT INTO shop.brand (slug, name_en, name_zh)
            VALUES ($1, $2, $3)
            RETURNING {TAXON_COLUMNS}
            "
        ))
        .bind(&input.slug)
        .bind(&input.name.en)
        .bind(&input.name.zh_tw)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "brand slug already exists"))?;

        Ok(Brand {
            id: BrandId::new(row.id),
            slug: row.slug,
            name: LocalizedText::new(row.name_en, row.name_zh),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Rename or re-slug a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand does not exist,
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(&self, id: BrandId, input: &TaxonInput) -> Result<Brand, RepositoryError> {
        let row = sqlx::query_as::<_, TaxonRow>(&format!(
            r"
            UPDATE shop.brand
            SET slug = $2, name_en = $3, name_zh = $4, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {TAXON_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(&input.slug)
        .bind(&input.name.en)
        .bind(&input.name.zh_tw)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "brand slug already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Brand {
            id: BrandId::new(row.id),
            slug: row.slug,
            name: LocalizedText::new(row.name_en, row.name_zh),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Soft-delete a brand. Refused while any live product still references
    /// it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand does not exist, and
    /// `RepositoryError::Conflict` if products still use it.
    pub async fn soft_delete(&self, id: BrandId) -> Result<(), RepositoryError> {
        let in_use: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shop.product WHERE brand_id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i32())
        .fetch_one(self.pool)
        .await?;

        if in_use > 0 {
            return Err(RepositoryError::Conflict(format!(
                "brand is used by {in_use} products"
            )));
        }

        let result = sqlx::query(
            r"
            UPDATE shop.brand
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
