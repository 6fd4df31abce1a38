//! Localized display text carried in up to three language variants.

use serde::{Deserialize, Serialize};

/// A string value translated into the closed language set {ua, ru, en}.
///
/// Every variant is optional; callers must tolerate an all-empty value and
/// render an empty string. The type is immutable; updates replace the whole
/// value rather than patching individual variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub ua: Option<String>,
    #[serde(default)]
    pub ru: Option<String>,
    #[serde(default)]
    pub en: Option<String>,
}

impl LocalizedText {
    pub fn new(
        ua: Option<impl Into<String>>,
        ru: Option<impl Into<String>>,
        en: Option<impl Into<String>>,
    ) -> Self {
        Self {
            ua: ua.map(Into::into),
            ru: ru.map(Into::into),
            en: en.map(Into::into),
        }
    }

    /// Value populated only in the Ukrainian variant.
    pub fn ua(text: impl Into<String>) -> Self {
        Self {
            ua: Some(text.into()),
            ..Self::default()
        }
    }

    /// Value populated only in the English variant.
    pub fn en(text: impl Into<String>) -> Self {
        Self {
            en: Some(text.into()),
            ..Self::default()
        }
    }

    /// Returns the first non-empty variant in {ua, ru, en} precedence,
    /// or an empty string when every variant is absent.
    pub fn display_text(&self) -> &str {
        [&self.ua, &self.ru, &self.en]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    /// True when no variant carries a non-empty string.
    pub fn is_empty(&self) -> bool {
        self.display_text().is_empty()
    }

    /// Case-insensitive substring test across every variant.
    ///
    /// `needle` must already be lowercased; this keeps the hot filter path
    /// from re-lowering the needle per record.
    pub fn contains_lower(&self, needle: &str) -> bool {
        [&self.ua, &self.ru, &self.en]
            .into_iter()
            .flatten()
            .any(|variant| variant.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text_follows_language_precedence() {
        let text = LocalizedText::new(Some("Чай"), Some("Чай зелёный"), Some("Green tea"));
        assert_eq!(text.display_text(), "Чай");

        let text = LocalizedText::new(None::<String>, Some("Чай зелёный"), Some("Green tea"));
        assert_eq!(text.display_text(), "Чай зелёный");

        let text = LocalizedText::en("Green tea");
        assert_eq!(text.display_text(), "Green tea");
    }

    #[test]
    fn display_text_skips_empty_variants() {
        let text = LocalizedText::new(Some(""), None::<String>, Some("Tea"));
        assert_eq!(text.display_text(), "Tea");
    }

    #[test]
    fn all_absent_renders_empty() {
        let text = LocalizedText::default();
        assert_eq!(text.display_text(), "");
        assert!(text.is_empty());
    }

    #[test]
    fn contains_lower_matches_any_variant() {
        let text = LocalizedText::new(Some("Смартфон"), None::<String>, Some("Smartphone"));
        assert!(text.contains_lower("смартфон"));
        assert!(text.contains_lower("phone"));
        assert!(!text.contains_lower("tablet"));
    }
}
