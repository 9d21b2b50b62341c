//! Blog and CMS content types for the back office.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jademart_core::{GalleryImageId, LocalizedText, PostId, SectionId};

/// A blog post as managed in the back office (drafts included).
#[derive(Debug, Clone, Serialize)]
pub struct BlogPost {
    pub id: PostId,
    pub slug: String,
    pub title: LocalizedText,
    pub excerpt: LocalizedText,
    pub body_markdown: String,
    pub cover_image: Option<String>,
    /// `None` while the post is a draft.
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a blog post.
#[derive(Debug, Clone, Deserialize)]
pub struct BlogPostInput {
    pub slug: String,
    pub title: LocalizedText,
    #[serde(default)]
    pub excerpt: LocalizedText,
    pub body_markdown: String,
    pub cover_image: Option<String>,
    /// Set to publish; omit to keep as draft.
    pub published_at: Option<DateTime<Utc>>,
}

/// A managed content section.
#[derive(Debug, Clone, Serialize)]
pub struct ContentSection {
    pub id: SectionId,
    pub kind: String,
    pub title: LocalizedText,
    pub body: LocalizedText,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub active: bool,
}

/// Input for creating or replacing a content section.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionInput {
    pub kind: String,
    pub title: LocalizedText,
    #[serde(default)]
    pub body: LocalizedText,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

const fn default_true() -> bool {
    true
}

/// One image in the homepage gallery.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryImage {
    pub id: GalleryImageId,
    pub url: String,
    pub caption: Option<LocalizedText>,
    pub sort_order: i32,
}

/// Input for the gallery replace operation: the full ordered list.
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryInput {
    pub images: Vec<GalleryImageInput>,
}

/// One entry of a gallery replacement.
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryImageInput {
    pub url: String,
    pub caption: Option<LocalizedText>,
}
