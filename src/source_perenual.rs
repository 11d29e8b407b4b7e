//! Perenual plant-database source.
//!
//! Queries the species list endpoint and keeps the first species whose
//! common name classifies as a flower; the endpoint happily returns trees,
//! vegetables and houseplants for loose queries.
//!
//! # Configuration
//!
//! ```toml
//! [sources.perenual]
//! url = "https://perenual.com/api/species-list"
//! timeout_secs = 15
//! api_key_env = "PERENUAL_API_KEY"
//! ```
//!
//! Status handling: `429` is a rate limit, `401` an invalid key.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::classify::is_flower_related;
use crate::config::PerenualConfig;
use crate::http::{build_client, get_json, StatusPolicy};
use crate::models::PlantRecord;
use crate::traits::{Source, SourceFailure, SourceOutcome};

const POLICY: StatusPolicy = StatusPolicy {
    rate_limited: &[429],
    unauthorized: &[401],
};

pub struct PerenualSource {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl PerenualSource {
    pub fn new(config: &PerenualConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs, None)?,
            url: config.url.clone(),
            api_key: config.resolve_api_key(),
        })
    }
}

#[async_trait]
impl Source for PerenualSource {
    type Output = PlantRecord;

    fn name(&self) -> &str {
        "perenual"
    }

    fn description(&self) -> &str {
        "Botanical data from the Perenual species list"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, term: &str) -> SourceOutcome<PlantRecord> {
        let Some(key) = self.api_key.as_deref() else {
            return SourceOutcome::Failed(SourceFailure::MissingKey);
        };

        let request = self.client.get(&self.url).query(&[
            ("key", key),
            ("q", term),
            ("edible", "false"),
            ("indoor", "false"),
            ("page", "1"),
        ]);

        match get_json(request, &POLICY).await {
            Ok(json) => SourceOutcome::from_option(first_flower(&json)),
            Err(failure) => SourceOutcome::Failed(failure),
        }
    }
}

/// Picks the first species in a species-list response whose common name
/// is flower-related.
pub fn first_flower(json: &Value) -> Option<PlantRecord> {
    json.get("data")?
        .as_array()?
        .iter()
        .find(|plant| {
            let common = string_field(plant, "common_name").unwrap_or_default();
            is_flower_related(&common.to_lowercase())
        })
        .map(to_record)
}

fn to_record(plant: &Value) -> PlantRecord {
    // The provider sends scientific_name as a list of synonyms, or
    // occasionally as a bare string.
    let scientific_name = match plant.get("scientific_name") {
        Some(Value::Array(names)) => names.first().and_then(|n| n.as_str()).map(String::from),
        Some(Value::String(name)) => Some(name.clone()),
        _ => None,
    };

    PlantRecord {
        name: string_field(plant, "common_name"),
        scientific_name,
        watering: string_field(plant, "watering"),
        sunlight: value_field(plant, "sunlight"),
        care_level: string_field(plant, "care_level"),
        cycle: string_field(plant, "cycle"),
        description: string_field(plant, "description"),
        growth_rate: string_field(plant, "growth_rate"),
        hardiness: value_field(plant, "hardiness"),
        flowers: value_field(plant, "flowers"),
        foliage: value_field(plant, "foliage"),
    }
}

fn string_field(v: &Value, key: &str) -> Option<String> {
    v.get(key)
        .and_then(|f| f.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn value_field(v: &Value, key: &str) -> Option<Value> {
    v.get(key).filter(|f| !f.is_null()).cloned()
}
