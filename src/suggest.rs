//! Alternative query suggestions for terms that did not classify as
//! flowers or found no data.

use std::collections::BTreeSet;

use crate::normalize::fold;
use crate::vocabulary::{DEFAULT_SUGGESTIONS, FLOWER_KEYWORDS, SYNONYMS};

/// Maximum number of suggestions returned.
pub const MAX_SUGGESTIONS: usize = 10;

/// Below this many matches the default list is mixed in.
const MIN_MATCHES: usize = 3;

/// Length of the prefix used for the "starts like" match.
const PREFIX_CHARS: usize = 3;

/// Builds up to [`MAX_SUGGESTIONS`] canonical flower names for `term`,
/// sorted and deduplicated.
///
/// Candidates are canonical names of synonyms whose spelling contains the
/// term, keywords that contain or are contained by the term, and keywords
/// sharing the term's first three characters. When fewer than three
/// candidates are found the default list is added.
pub fn suggestions_for(term: &str) -> Vec<String> {
    let term = fold(term);
    let mut found: BTreeSet<String> = BTreeSet::new();

    for (spelling, canonical) in SYNONYMS.iter() {
        if spelling.contains(term.as_str()) {
            found.insert(canonical.to_string());
        }
    }

    for keyword in FLOWER_KEYWORDS.iter() {
        if keyword.folded.contains(term.as_str()) || term.contains(keyword.folded.as_str()) {
            found.insert(keyword.name.to_string());
        }
    }

    let prefix: String = term.chars().take(PREFIX_CHARS).collect();
    if !prefix.is_empty() {
        for keyword in FLOWER_KEYWORDS.iter() {
            if keyword.folded.starts_with(prefix.as_str()) {
                found.insert(keyword.name.to_string());
            }
        }
    }

    if found.len() < MIN_MATCHES {
        found.extend(DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()));
    }

    found.into_iter().take(MAX_SUGGESTIONS).collect()
}
