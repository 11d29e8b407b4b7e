//! Merges the botanical record and the encyclopedia record into the plant
//! description shown to the user.

use crate::models::{EncyclopediaRecord, PlantInfo, PlantRecord};
use crate::normalize::scientific_name;

/// Separator between the botanical description and an appended summary.
const PARAGRAPH_BREAK: &str = "\n\n";

/// Builds the user-facing plant description.
///
/// - Without a botanical record, starts from a bare record named after the
///   capitalized query.
/// - The encyclopedia page title fills a missing scientific name.
/// - The encyclopedia summary is appended to the description after a blank
///   line, unless the description already contains it.
/// - A scientific name still missing after that is resolved from the query.
///
/// Never fails; missing inputs only make the output sparser.
pub fn enhance(
    plant: Option<PlantRecord>,
    encyclopedia: Option<&EncyclopediaRecord>,
    query: &str,
) -> PlantInfo {
    let mut info = plant.unwrap_or_else(|| PlantRecord {
        name: Some(capitalize(query)),
        ..PlantRecord::default()
    });

    if let Some(page) = encyclopedia {
        if info.scientific_name.is_none() {
            info.scientific_name = Some(page.title.clone());
        }

        if let Some(summary) = page.summary.as_deref() {
            info.description = Some(match info.description.take() {
                Some(existing) if !existing.is_empty() => {
                    if existing.contains(summary) {
                        existing
                    } else {
                        format!("{}{}{}", existing, PARAGRAPH_BREAK, summary)
                    }
                }
                _ => summary.to_string(),
            });
        }
    }

    if info.scientific_name.is_none() {
        info.scientific_name = Some(scientific_name(query));
    }

    info
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}
