//! Core data models used throughout BloomHub.
//!
//! These types represent the partial records produced by each source
//! adapter, the merged plant description, and the composite response
//! assembled for one search request.

use serde::{Deserialize, Serialize};

/// Botanical attributes for one species, as reported by the plant-database
/// source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub name: Option<String>,
    pub scientific_name: Option<String>,
    pub watering: Option<String>,
    pub sunlight: Option<serde_json::Value>,
    pub care_level: Option<String>,
    pub cycle: Option<String>,
    pub description: Option<String>,
    pub growth_rate: Option<String>,
    pub hardiness: Option<serde_json::Value>,
    pub flowers: Option<serde_json::Value>,
    pub foliage: Option<serde_json::Value>,
}

/// Summary of one encyclopedia page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncyclopediaRecord {
    pub title: String,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub extract: Option<String>,
}

/// The user-facing plant description produced by [`crate::enhance`].
///
/// Same shape as [`PlantRecord`]; `name` and `scientific_name` are always
/// populated after enhancement.
pub type PlantInfo = PlantRecord;

/// Which of the four sources contributed to a composite result.
///
/// Each flag reflects whether that source's adapter returned data in the
/// pass that produced the composite. Never set independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub perenual: bool,
    pub pixabay: bool,
    pub unsplash: bool,
    pub wikipedia: bool,
}

impl Provenance {
    pub fn any(&self) -> bool {
        self.perenual || self.pixabay || self.unsplash || self.wikipedia
    }
}

/// Merged, multi-source response body for one search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub plant_info: PlantInfo,
    pub images: Vec<String>,
    pub wikipedia: Option<EncyclopediaRecord>,
    pub query: String,
    pub normalized_query: String,
    pub sources: Provenance,
}

/// A registered account. The password hash never leaves the `auth` module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}
