//! Request form payloads and their conversions into typed domain values.
//!
//! Forms mirror the raw shapes clients submit; each converts via `TryFrom`
//! into a validated payload carrying proper domain types. Malformed optional
//! identifiers inside lists are dropped rather than failing the request;
//! malformed required fields fail the conversion.

pub mod categories;
pub mod products;

use serde::{Deserialize, Deserializer};

use crate::domain::localized::LocalizedText;

/// Raw localized text as submitted by clients.
///
/// Blank or whitespace-only variants collapse to `None` during conversion.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocalizedTextForm {
    #[serde(default)]
    pub ua: Option<String>,
    #[serde(default)]
    pub ru: Option<String>,
    #[serde(default)]
    pub en: Option<String>,
}

impl LocalizedTextForm {
    pub fn into_localized(self) -> LocalizedText {
        fn clean(variant: Option<String>) -> Option<String> {
            variant
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        }
        LocalizedText {
            ua: clean(self.ua),
            ru: clean(self.ru),
            en: clean(self.en),
        }
    }
}

/// Deserializes a nested option so that an explicit `null` clears the field
/// while an absent key leaves it unchanged.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
