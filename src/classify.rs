//! Flower-relevance classification.
//!
//! A closed-vocabulary check: a term is on-topic if it matches a known
//! flower name (exactly, or as a substring in either direction), or if it
//! contains one of a handful of flower roots and generic words such as
//! "flor", "flower", "bloom". Used for search queries and for free text
//! returned by providers (species names, encyclopedia summaries).

use crate::normalize::{fold, normalize};
use crate::vocabulary::{FLOWER_KEYWORDS, RELEVANCE_REGEXES};

/// Returns `true` if `text` looks flower-related.
///
/// The input is normalized first, so raw queries and already-normalized
/// terms classify the same way. Empty input, or input that normalizes to
/// an empty key (e.g. `"es"`), is never relevant.
pub fn is_flower_related(text: &str) -> bool {
    let Some(normalized) = normalize(text) else {
        return false;
    };
    // Canonical names may carry accents; compare on the folded form.
    let term = fold(&normalized);
    if term.is_empty() {
        return false;
    }

    let keyword_hit = FLOWER_KEYWORDS.iter().any(|k| {
        k.folded == term || k.folded.contains(term.as_str()) || term.contains(k.folded.as_str())
    });
    if keyword_hit {
        return true;
    }

    RELEVANCE_REGEXES.iter().any(|re| re.is_match(&term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_is_relevant() {
        for keyword in FLOWER_KEYWORDS.iter() {
            assert!(is_flower_related(keyword.name), "{} not relevant", keyword.name);
        }
    }

    #[test]
    fn test_unrelated_terms() {
        assert!(!is_flower_related("calculadora"));
        assert!(!is_flower_related("xyzabc"));
        assert!(!is_flower_related("keyboard"));
    }

    #[test]
    fn test_empty_input() {
        assert!(!is_flower_related(""));
        assert!(!is_flower_related("   "));
        assert!(!is_flower_related("es"));
    }

    #[test]
    fn test_substring_matches() {
        // term contained in a keyword
        assert!(is_flower_related("tulip"));
        // keyword contained in the term
        assert!(is_flower_related("rosa damascena"));
    }

    #[test]
    fn test_pattern_fallback() {
        assert!(is_flower_related("Cherry blossom"));
        assert!(is_flower_related("wildflower meadow"));
        assert!(is_flower_related("Floración tardía"));
    }

    #[test]
    fn test_accented_and_plural_queries() {
        assert!(is_flower_related("Peonías"));
        assert!(is_flower_related("ORQUIDEAS"));
        assert!(is_flower_related("rosas"));
    }

    #[test]
    fn test_summary_text() {
        let summary = "Paeonia es un género de plantas con flores de la familia Paeoniaceae.";
        assert!(is_flower_related(summary));
        let off_topic = "Una calculadora es un dispositivo que realiza operaciones aritméticas.";
        assert!(!is_flower_related(off_topic));
    }
}
