//! Seed the shop database with a small demo catalog.
//!
//! Idempotent: rows are keyed by slug and skipped when already present.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for the shop

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

struct DemoProduct {
    slug: &'static str,
    name_en: &'static str,
    name_zh: &'static str,
    description_en: &'static str,
    description_zh: &'static str,
    price: Decimal,
    stock: i32,
    category_slug: &'static str,
    brand_slug: &'static str,
}

const DEMO_CATEGORIES: &[(&str, &str, &str)] = &[
    ("tea", "Tea", "茶葉"),
    ("ceramics", "Ceramics", "陶瓷"),
    ("snacks", "Snacks", "零食"),
];

const DEMO_BRANDS: &[(&str, &str, &str)] = &[
    ("mountain-mist", "Mountain Mist", "山嵐"),
    ("old-town", "Old Town", "老街"),
];

fn demo_products() -> Vec<DemoProduct> {
    vec![
        DemoProduct {
            slug: "high-mountain-oolong",
            name_en: "High Mountain Oolong",
            name_zh: "高山烏龍",
            description_en: "Hand-picked oolong from the central highlands.",
            description_zh: "中央山脈手採烏龍茶。",
            price: Decimal::new(68000, 2),
            stock: 40,
            category_slug: "tea",
            brand_slug: "mountain-mist",
        },
        DemoProduct {
            slug: "celadon-teapot",
            name_en: "Celadon Teapot",
            name_zh: "青瓷茶壺",
            description_en: "Small-batch celadon teapot, 350ml.",
            description_zh: "小批量燒製青瓷茶壺，350 毫升。",
            price: Decimal::new(245000, 2),
            stock: 12,
            category_slug: "ceramics",
            brand_slug: "old-town",
        },
        DemoProduct {
            slug: "pineapple-cakes",
            name_en: "Pineapple Cakes (Box of 10)",
            name_zh: "鳳梨酥（十入）",
            description_en: "Classic pastry with a buttery crust.",
            description_zh: "經典奶油酥皮鳳梨酥。",
            price: Decimal::new(42000, 2),
            stock: 80,
            category_slug: "snacks",
            brand_slug: "old-town",
        },
    ]
}

/// Insert the demo catalog.
///
/// # Errors
///
/// Returns `SeedError` if the URL is missing or a query fails.
pub async fn demo_catalog() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .map_err(|_| SeedError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    let pool = PgPool::connect(&database_url).await?;

    for (slug, en, zh) in DEMO_CATEGORIES {
        sqlx::query(
            r"
            INSERT INTO shop.category (slug, name_en, name_zh)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) WHERE deleted_at IS NULL DO NOTHING
            ",
        )
        .bind(slug)
        .bind(en)
        .bind(zh)
        .execute(&pool)
        .await?;
    }

    for (slug, en, zh) in DEMO_BRANDS {
        sqlx::query(
            r"
            INSERT INTO shop.brand (slug, name_en, name_zh)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) WHERE deleted_at IS NULL DO NOTHING
            ",
        )
        .bind(slug)
        .bind(en)
        .bind(zh)
        .execute(&pool)
        .await?;
    }

    let mut inserted = 0_u32;
    for product in demo_products() {
        let result = sqlx::query(
            r"
            INSERT INTO shop.product
                (slug, name_en, name_zh, description_en, description_zh,
                 price, stock, category_id, brand_id, published)
            SELECT $1, $2, $3, $4, $5, $6, $7, c.id, b.id, TRUE
            FROM shop.category c, shop.brand b
            WHERE c.slug = $8 AND b.slug = $9
            ON CONFLICT (slug) WHERE deleted_at IS NULL DO NOTHING
            ",
        )
        .bind(product.slug)
        .bind(product.name_en)
        .bind(product.name_zh)
        .bind(product.description_en)
        .bind(product.description_zh)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.category_slug)
        .bind(product.brand_slug)
        .execute(&pool)
        .await?;
        inserted += u32::try_from(result.rows_affected()).unwrap_or(0);
    }

    tracing::info!("Demo catalog seeded ({} new products)", inserted);
    Ok(())
}
