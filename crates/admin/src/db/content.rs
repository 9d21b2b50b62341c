//! Blog and CMS content repository (shop database).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use jademart_core::{GalleryImageId, LocalizedText, PostId, SectionId};

use super::RepositoryError;
use crate::models::content::{
    BlogPost, BlogPostInput, ContentSection, GalleryImage, GalleryImageInput, SectionInput,
};

/// Repository for blog posts, content sections, and the gallery.
pub struct ContentRepository<'a> {
    pool: &'a PgPool,
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
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> BlogPost {
        BlogPost {
            id: PostId::new(self.id),
            slug: self.slug,
            title: LocalizedText::new(self.title_en, self.title_zh),
            excerpt: LocalizedText::new(self.excerpt_en, self.excerpt_zh),
            body_markdown: self.body_markdown,
            cover_image: self.cover_image,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
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
    active: bool,
}

impl SectionRow {
    fn into_section(self) -> ContentSection {
        ContentSection {
            id: SectionId::new(self.id),
            kind: self.kind,
            title: LocalizedText::new(self.title_en, self.title_zh),
            body: LocalizedText::new(self.body_en, self.body_zh),
            image_url: self.image_url,
            link_url: self.link_url,
            sort_order: self.sort_order,
            active: self.active,
        }
    }
}

#[derive(sqlx::FromRow)]
struct GalleryRow {
    id: i32,
    url: String,
    caption_en: Option<String>,
    caption_zh: Option<String>,
    sort_order: i32,
}

impl GalleryRow {
    fn into_image(self) -> GalleryImage {
        let caption = match (self.caption_en, self.caption_zh) {
            (None, None) => None,
            (en, zh) => Some(LocalizedText::new(
                en.unwrap_or_default(),
                zh.unwrap_or_default(),
            )),
        };
        GalleryImage {
            id: GalleryImageId::new(self.id),
            url: self.url,
            caption,
            sort_order: self.sort_order,
        }
    }
}

const POST_COLUMNS: &str = "id, slug, title_en, title_zh, excerpt_en, excerpt_zh, \
     body_markdown, cover_image, published_at, created_at, updated_at";

const SECTION_COLUMNS: &str = "id, kind, title_en, title_zh, body_en, body_zh, \
     image_url, link_url, sort_order, active";

const GALLERY_COLUMNS: &str = "id, url, caption_en, caption_zh, sort_order";

impl<'a> ContentRepository<'a> {
    /// Create a new content repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // ==================== blog posts ====================

    /// List posts, drafts included, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_posts(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<BlogPost>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r"
            SELECT {POST_COLUMNS}
            FROM shop.blog_post
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
            sqlx::query_scalar("SELECT COUNT(*) FROM shop.blog_post WHERE deleted_at IS NULL")
                .fetch_one(self.pool)
                .await?;

        Ok((rows.into_iter().map(PostRow::into_post).collect(), total))
    }

    /// Get a post by ID, drafts included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_post(&self, id: PostId) -> Result<Option<BlogPost>, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM shop.blog_post WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(PostRow::into_post))
    }

    /// Create a post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create_post(&self, input: &BlogPostInput) -> Result<BlogPost, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r"
            INSERT INTO shop.blog_post
                (slug, title_en, title_zh, excerpt_en, excerpt_zh,
                 body_markdown, cover_image, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {POST_COLUMNS}
            "
        ))
        .bind(&input.slug)
        .bind(&input.title.en)
        .bind(&input.title.zh_tw)
        .bind(&input.excerpt.en)
        .bind(&input.excerpt.zh_tw)
        .bind(&input.body_markdown)
        .bind(&input.cover_image)
        .bind(input.published_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "post slug already exists"))?;

        Ok(row.into_post())
    }

    /// Replace a post's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post does not exist,
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update_post(
        &self,
        id: PostId,
        input: &BlogPostInput,
    ) -> Result<BlogPost, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r"
            UPDATE shop.blog_post
            SET slug = $2, title_en = $3, title_zh = $4, excerpt_en = $5, excerpt_zh = $6,
                body_markdown = $7, cover_image = $8, published_at = $9, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {POST_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(&input.slug)
        .bind(&input.title.en)
        .bind(&input.title.zh_tw)
        .bind(&input.excerpt.en)
        .bind(&input.excerpt.zh_tw)
        .bind(&input.body_markdown)
        .bind(&input.cover_image)
        .bind(input.published_at)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "post slug already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into_post())
    }

    /// Soft-delete a post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post does not exist.
    pub async fn soft_delete_post(&self, id: PostId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.blog_post
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

    // ==================== content sections ====================

    /// List all sections, active or not, in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_sections(&self) -> Result<Vec<ContentSection>, RepositoryError> {
        let rows = sqlx::query_as::<_, SectionRow>(&format!(
            r"
            SELECT {SECTION_COLUMNS}
            FROM shop.content_section
            ORDER BY kind ASC, sort_order ASC, id ASC
            "
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(SectionRow::into_section).collect())
    }

    /// Create a section.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_section(
        &self,
        input: &SectionInput,
    ) -> Result<ContentSection, RepositoryError> {
        let row = sqlx::query_as::<_, SectionRow>(&format!(
            r"
            INSERT INTO shop.content_section
                (kind, title_en, title_zh, body_en, body_zh,
                 image_url, link_url, sort_order, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SECTION_COLUMNS}
            "
        ))
        .bind(&input.kind)
        .bind(&input.title.en)
        .bind(&input.title.zh_tw)
        .bind(&input.body.en)
        .bind(&input.body.zh_tw)
        .bind(&input.image_url)
        .bind(&input.link_url)
        .bind(input.sort_order)
        .bind(input.active)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into_section())
    }

    /// Replace a section's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the section does not exist.
    pub async fn update_section(
        &self,
        id: SectionId,
        input: &SectionInput,
    ) -> Result<ContentSection, RepositoryError> {
        let row = sqlx::query_as::<_, SectionRow>(&format!(
            r"
            UPDATE shop.content_section
            SET kind = $2, title_en = $3, title_zh = $4, body_en = $5, body_zh = $6,
                image_url = $7, link_url = $8, sort_order = $9, active = $10
            WHERE id = $1
            RETURNING {SECTION_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(&input.kind)
        .bind(&input.title.en)
        .bind(&input.title.zh_tw)
        .bind(&input.body.en)
        .bind(&input.body.zh_tw)
        .bind(&input.image_url)
        .bind(&input.link_url)
        .bind(input.sort_order)
        .bind(input.active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into_section())
    }

    /// Delete a section.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the section does not exist.
    pub async fn delete_section(&self, id: SectionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.content_section WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // ==================== gallery ====================

    /// List the gallery in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_gallery(&self) -> Result<Vec<GalleryImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, GalleryRow>(&format!(
            "SELECT {GALLERY_COLUMNS} FROM shop.gallery_image ORDER BY sort_order ASC, id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(GalleryRow::into_image).collect())
    }

    /// Replace the whole gallery with a new ordered list.
    ///
    /// Runs in one transaction; the storefront never sees a half-replaced
    /// gallery.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn replace_gallery(
        &self,
        images: &[GalleryImageInput],
    ) -> Result<Vec<GalleryImage>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM shop.gallery_image").execute(&mut *tx).await?;

        let mut replaced = Vec::with_capacity(images.len());
        for (position, image) in images.iter().enumerate() {
            let sort_order = i32::try_from(position).map_err(|_| {
                RepositoryError::Conflict("too many gallery images".to_owned())
            })?;

            let row = sqlx::query_as::<_, GalleryRow>(&format!(
                r"
                INSERT INTO shop.gallery_image (url, caption_en, caption_zh, sort_order)
                VALUES ($1, $2, $3, $4)
                RETURNING {GALLERY_COLUMNS}
                "
            ))
            .bind(&image.url)
            .bind(image.caption.as_ref().map(|c| c.en.clone()))
            .bind(image.caption.as_ref().map(|c| c.zh_tw.clone()))
            .bind(sort_order)
            .fetch_one(&mut *tx)
            .await?;

            replaced.push(row.into_image());
        }

        tx.commit().await?;
        Ok(replaced)
    }
}
