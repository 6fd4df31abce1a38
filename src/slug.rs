//! URL-safe slug derivation for catalog entities.
//!
//! Slugs are lowercase, ASCII, hyphen-separated identifiers derived from
//! display text. Cyrillic input is transliterated with a fixed letter map;
//! anything that survives neither transliteration nor the ASCII word-class
//! filter is stripped. Uniqueness handled here is advisory only; the
//! persisted store must still enforce a hard uniqueness constraint.

use std::collections::HashSet;

use crate::domain::localized::LocalizedText;

/// Maximum accepted slug length.
pub const MAX_SLUG_LEN: usize = 100;

/// Fixed Cyrillic-to-Latin letter map. `ъ` and `ь` map to nothing.
fn transliterate(c: char) -> Option<&'static str> {
    let mapped = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' | 'ы' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(mapped)
}

/// Derives a slug from raw text.
///
/// Lowercases and trims the input, transliterates Cyrillic letters, drops
/// any remaining character outside `[a-z0-9_]`, collapses runs of
/// whitespace, underscores and hyphens into a single hyphen and trims
/// leading/trailing hyphens. Empty input yields an empty string; callers
/// must reject an empty result before relying on it as an identifier.
pub fn generate(source: &str) -> String {
    let lowered = source.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_separator = false;

    for c in lowered.chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            pending_separator = !slug.is_empty();
            continue;
        }
        let piece = match transliterate(c) {
            Some(latin) => latin,
            None if c.is_ascii_alphanumeric() => {
                if pending_separator {
                    slug.push('-');
                    pending_separator = false;
                }
                slug.push(c);
                continue;
            }
            // Anything else (punctuation, non-mapped alphabets) is stripped.
            None => continue,
        };
        if piece.is_empty() {
            continue;
        }
        if pending_separator {
            slug.push('-');
            pending_separator = false;
        }
        slug.push_str(piece);
    }

    slug
}

/// Derives a slug from localized text, resolving the display variant first.
pub fn generate_localized(text: &LocalizedText) -> String {
    generate(text.display_text())
}

/// Derives a slug guaranteed to be absent from `existing` by appending
/// `-1`, `-2`, ... to the base slug.
///
/// Deterministic for a stable snapshot of `existing`; concurrent creators
/// can still race, so the store-level uniqueness constraint remains the
/// source of truth.
pub fn generate_unique(source: &str, existing: &HashSet<String>) -> String {
    let base = generate(source);
    if !existing.contains(&base) {
        return base;
    }
    let mut counter = 1usize;
    loop {
        let candidate = format!("{base}-{counter}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// True iff `slug` matches `^[a-z0-9]+(-[a-z0-9]+)*$` and is at most
/// [`MAX_SLUG_LEN`] bytes long.
pub fn is_valid(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return false;
    }
    slug.split('-').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    })
}
