//! Blog and CMS content repository.
//!
//! Blog bodies are stored as Markdown; rendering to HTML happens in the
//! route layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use jademart_core::{GalleryImageId, LocalizedText, PostId, SectionId};

use super::RepositoryError;
use crate::models::content::{BlogPostSummary, ContentSection, GalleryImage, SectionKind};

/// Repository for published blog posts, content sections, and the gallery.
pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

/// A published post with its raw Markdown body.
#[derive(Debug, Clone)]
pub struct BlogPostSource {
    pub id: PostId,
    pub slug: String,
    pub title: LocalizedText,
    pub excerpt: LocalizedText,
    pub body_markdown: String,
    pub cover_image: Option<String>,
    pub published_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PostSummaryRow {
    id: i32,
    slug: String,
    title_en: String,
    title_zh: String,
    excerpt_en: String,
    excerpt_zh: String,
    cover_image: Option<String>,
    published_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i32,
    slug: String,
    title_en: String,
    title_zh: String,
    excerpt_en: String,
    excerpt_zh: String,
    body_markdown: String,
    cover_image: Option<String>,
    published_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct SectionRow {
    id: i32,
    kind: String,
    title_en: String,
    title_zh: String,
    body_en: String,
    body_zh: String,
    image_url: Option<String>,
    link_url: Option<String>,
    sort_order: i32,
}

#[derive(sqlx::FromRow)]
struct GalleryRow {
    id: i32,
    url: String,
    caption_en: Option<String>,
    caption_zh: Option<String>,
    sort_order: i32,
}

impl<'a> ContentRepository<'a> {
    /// Create a new content repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List published posts, newest first, plus the total for pagination.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_posts(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<BlogPostSummary>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, PostSummaryRow>(
            r"
            SELECT id, slug, title_en, title_zh, excerpt_en, excerpt_zh,
                   cover_image, published_at
            FROM shop.blog_post
            WHERE published_at IS NOT NULL AND published_at <= NOW()
            ORDER BY published_at DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM shop.blog_post
            WHERE published_at IS NOT NULL AND published_at <= NOW()
            ",
        )
        .fetch_one(self.pool)
        .await?;

        let posts = rows
            .into_iter()
            .map(|r| BlogPostSummary {
                id: PostId::new(r.id),
                slug: r.slug,
                title: LocalizedText::new(r.title_en, r.title_zh),
                excerpt: LocalizedText::new(r.excerpt_en, r.excerpt_zh),
                cover_image: r.cover_image,
                published_at: r.published_at,
            })
            .collect();

        Ok((posts, total))
    }

    /// Get a published post by slug, body still in Markdown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_post_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<BlogPostSource>, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(
            r"
            SELECT id, slug, title_en, title_zh, excerpt_en, excerpt_zh,
                   body_markdown, cover_image, published_at
            FROM shop.blog_post
            WHERE slug = $1 AND published_at IS NOT NULL AND published_at <= NOW()
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| BlogPostSource {
            id: PostId::new(r.id),
            slug: r.slug,
            title: LocalizedText::new(r.title_en, r.title_zh),
            excerpt: LocalizedText::new(r.excerpt_en, r.excerpt_zh),
            body_markdown: r.body_markdown,
            cover_image: r.cover_image,
            published_at: r.published_at,
        }))
    }

    /// List active content sections, optionally filtered by kind, in sort
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` for an unknown stored kind.
    pub async fn list_sections(
        &self,
        kind: Option<SectionKind>,
    ) -> Result<Vec<ContentSection>, RepositoryError> {
        let rows = match kind {
            Some(kind) => {
                sqlx::query_as::<_, SectionRow>(
                    r"
                    SELECT id, kind, title_en, title_zh, body_en, body_zh,
                           image_url, link_url, sort_order
                    FROM shop.content_section
                    WHERE active AND kind = $1
                    ORDER BY sort_order ASC, id ASC
                    ",
                )
                .bind(kind.as_str())
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, SectionRow>(
                    r"
                    SELECT id, kind, title_en, title_zh, body_en, body_zh,
                           image_url, link_url, sort_order
                    FROM shop.content_section
                    WHERE active
                    ORDER BY kind ASC, sort_order ASC, id ASC
                    ",
                )
                .fetch_all(self.pool)
                .await?
            }
        };

        rows.into_iter()
            .map(|r| {
                let kind = r.kind.parse::<SectionKind>().map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "invalid section kind in database: {e}"
                    ))
                })?;
                Ok(ContentSection {
                    id: SectionId::new(r.id),
                    kind,
                    title: LocalizedText::new(r.title_en, r.title_zh),
                    body: LocalizedText::new(r.body_en, r.body_zh),
                    image_url: r.image_url,
                    link_url: r.link_url,
                    sort_order: r.sort_order,
                })
            })
            .collect()
    }

    /// List the homepage gallery in sort order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_gallery(&self) -> Result<Vec<GalleryImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, GalleryRow>(
            r"
            SELECT id, url, caption_en, caption_zh, sort_order
            FROM shop.gallery_image
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| GalleryImage {
                id: GalleryImageId::new(r.id),
                url: r.url,
                caption: match (r.caption_en, r.caption_zh) {
                    (None, None) => None,
                    (en, zh) => Some(LocalizedText::new(
                        en.unwrap_or_default(),
                        zh.unwrap_or_default(),
                    )),
                },
                sort_order: r.sort_order,
            })
            .collect())
    }
}
