//! Localized text pairs for the bilingual catalog/CMS data.
//!
//! Every user-visible catalog and CMS string is stored in both English and
//! Traditional Chinese. The JSON representation matches the stored data shape
//! exactly: `{ "en": "...", "zh-TW": "..." }`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Supported display locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locale {
    /// English.
    #[default]
    #[serde(rename = "en")]
    En,
    /// Traditional Chinese (Taiwan).
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::ZhTw => write!(f, "zh-TW"),
        }
    }
}

/// Errors that can occur when validating a [`LocalizedText`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum LocalizedTextError {
    /// A required variant is empty.
    #[error("localized text is missing the {0} variant")]
    MissingVariant(Locale),
}

/// A bilingual string pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LocalizedText {
    /// English variant.
    pub en: String,
    /// Traditional Chinese variant.
    #[serde(rename = "zh-TW")]
    pub zh_tw: String,
}

impl LocalizedText {
    /// Create a localized text pair.
    #[must_use]
    pub fn new(en: impl Into<String>, zh_tw: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            zh_tw: zh_tw.into(),
        }
    }

    /// Validate that both variants are present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns `LocalizedTextError::MissingVariant` naming the first empty
    /// variant.
    pub fn require_both(&self) -> Result<(), LocalizedTextError> {
        if self.en.trim().is_empty() {
            return Err(LocalizedTextError::MissingVariant(Locale::En));
        }
        if self.zh_tw.trim().is_empty() {
            return Err(LocalizedTextError::MissingVariant(Locale::ZhTw));
        }
        Ok(())
    }

    /// Pick the variant for a locale, falling back to English when the
    /// requested variant is blank.
    #[must_use]
    pub fn pick(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::ZhTw => {
                if self.zh_tw.trim().is_empty() {
                    &self.en
                } else {
                    &self.zh_tw
                }
            }
        }
    }

    /// True if both variants are blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.en.trim().is_empty() && self.zh_tw.trim().is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_zh_tw_key() {
        let text = LocalizedText::new("Teapot", "茶壺");
        let json = serde_json::to_string(&text).unwrap();
        assert_eq!(json, r#"{"en":"Teapot","zh-TW":"茶壺"}"#);

        let back: LocalizedText = serde_json::from_str(&json).unwrap();
        assert_eq!(back, text);
    }

    #[test]
    fn test_require_both() {
        assert!(LocalizedText::new("Teapot", "茶壺").require_both().is_ok());
        assert!(matches!(
            LocalizedText::new("", "茶壺").require_both(),
            Err(LocalizedTextError::MissingVariant(Locale::En))
        ));
        assert!(matches!(
            LocalizedText::new("Teapot", "  ").require_both(),
            Err(LocalizedTextError::MissingVariant(Locale::ZhTw))
        ));
    }

    #[test]
    fn test_pick_falls_back_to_english() {
        let text = LocalizedText::new("Teapot", "");
        assert_eq!(text.pick(Locale::ZhTw), "Teapot");

        let text = LocalizedText::new("Teapot", "茶壺");
        assert_eq!(text.pick(Locale::ZhTw), "茶壺");
        assert_eq!(text.pick(Locale::En), "Teapot");
    }
}
