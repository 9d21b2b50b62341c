//! Blog and CMS content types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jademart_core::{GalleryImageId, LocalizedText, PostId, SectionId};

/// A published blog post, body rendered to HTML.
#[derive(Debug, Clone, Serialize)]
pub struct BlogPost {
    pub id: PostId,
    pub slug: String,
    pub title: LocalizedText,
    /// Short teaser used on listing pages.
    pub excerpt: LocalizedText,
    /// Body rendered from Markdown to sanitized HTML.
    pub body_html: String,
    pub cover_image: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Summary form of a post for the listing page (no body).
#[derive(Debug, Clone, Serialize)]
pub struct BlogPostSummary {
    pub id: PostId,
    pub slug: String,
    pub title: LocalizedText,
    pub excerpt: LocalizedText,
    pub cover_image: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// The kinds of managed page sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Hero,
    Feature,
    Guarantee,
}

impl SectionKind {
    /// Stored spelling of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Feature => "feature",
            Self::Guarantee => "guarantee",
        }
    }
}

impl std::str::FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hero" => Ok(Self::Hero),
            "feature" => Ok(Self::Feature),
            "guarantee" => Ok(Self::Guarantee),
            _ => Err(format!("invalid section kind: {s}")),
        }
    }
}

/// A managed content section (hero banner, feature card, guarantee blurb).
#[derive(Debug, Clone, Serialize)]
pub struct ContentSection {
    pub id: SectionId,
    pub kind: SectionKind,
    pub title: LocalizedText,
    pub body: LocalizedText,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: i32,
}

/// One image in the homepage gallery.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryImage {
    pub id: GalleryImageId,
    pub url: String,
    pub caption: Option<LocalizedText>,
    pub sort_order: i32,
}
