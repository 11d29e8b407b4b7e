//! Query normalization and scientific-name resolution.
//!
//! A raw query becomes a lookup key in four steps:
//!
//! 1. lowercase and trim,
//! 2. fold diacritics to their closest unaccented letter (`peonía` → `peonia`),
//! 3. strip a plural suffix: `es` if present, otherwise a single `s`,
//! 4. replace the result with its canonical spelling from the synonym table.
//!
//! The suffix rule is deliberately naive (`narcisos` → `narciso`, but also
//! `hibiscus` → `hibiscu`); the synonym table is indexed against exactly
//! this rule.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::vocabulary::{SCIENTIFIC_NAMES, SYNONYMS};

/// Lowercases, trims, and strips diacritics.
///
/// Characters without a canonical decomposition that still have a common
/// ASCII spelling (`ß`, `æ`, `ø`, ...) are transliterated explicitly.
pub fn fold(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());

    for c in lowered.trim().nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match c {
            'ß' => out.push_str("ss"),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'ø' => out.push('o'),
            'đ' => out.push('d'),
            'ł' => out.push('l'),
            other => out.push(other),
        }
    }

    out
}

/// Strips a trailing `es`, or else a trailing `s`.
pub fn depluralize(term: &str) -> &str {
    if let Some(stem) = term.strip_suffix("es") {
        stem
    } else if let Some(stem) = term.strip_suffix('s') {
        stem
    } else {
        term
    }
}

/// Canonicalizes a free-text query into a lookup key.
///
/// Returns `None` for empty or whitespace-only input.
///
/// ```
/// use bloomhub::normalize::normalize;
///
/// assert_eq!(normalize("Rosas").as_deref(), Some("rosa"));
/// assert_eq!(normalize("  "), None);
/// ```
pub fn normalize(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }

    let folded = fold(raw);
    let stem = depluralize(&folded);

    Some(match SYNONYMS.get(stem) {
        Some(canonical) => canonical.to_string(),
        None => stem.to_string(),
    })
}

/// Resolves a common name to its scientific name.
///
/// Unknown names come back unchanged; that is a valid outcome, not an error.
pub fn scientific_name(common_name: &str) -> String {
    normalize(common_name)
        .and_then(|key| SCIENTIFIC_NAMES.get(&key).map(|s| s.to_string()))
        .unwrap_or_else(|| common_name.to_string())
}
