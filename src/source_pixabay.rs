//! Pixabay image source.
//!
//! Searches for `"{term} flower"` restricted to nature photos and returns
//! the web-format URLs of the hits.
//!
//! Status handling: `429` is a rate limit, `401`/`403` an invalid key.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::PixabayConfig;
use crate::http::{build_client, get_json, StatusPolicy};
use crate::traits::{Source, SourceFailure, SourceOutcome};

const POLICY: StatusPolicy = StatusPolicy {
    rate_limited: &[429],
    unauthorized: &[401, 403],
};

pub struct PixabaySource {
    client: Client,
    url: String,
    per_page: u32,
    api_key: Option<String>,
}

impl PixabaySource {
    pub fn new(config: &PixabayConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs, None)?,
            url: config.url.clone(),
            per_page: config.per_page,
            api_key: config.resolve_api_key(),
        })
    }
}

#[async_trait]
impl Source for PixabaySource {
    type Output = Vec<String>;

    fn name(&self) -> &str {
        "pixabay"
    }

    fn description(&self) -> &str {
        "Flower photos from Pixabay"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, term: &str) -> SourceOutcome<Vec<String>> {
        let Some(key) = self.api_key.as_deref() else {
            return SourceOutcome::Failed(SourceFailure::MissingKey);
        };

        let query = format!("{} flower", term);
        let per_page = self.per_page.to_string();
        let request = self.client.get(&self.url).query(&[
            ("key", key),
            ("q", query.as_str()),
            ("image_type", "photo"),
            ("category", "nature"),
            ("safesearch", "true"),
            ("per_page", per_page.as_str()),
        ]);

        match get_json(request, &POLICY).await {
            Ok(json) => SourceOutcome::from_items(image_urls(&json)),
            Err(failure) => SourceOutcome::Failed(failure),
        }
    }
}

/// Extracts `hits[].webformatURL`, skipping hits without one.
pub fn image_urls(json: &Value) -> Vec<String> {
    json.get("hits")
        .and_then(|h| h.as_array())
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| hit.get("webformatURL").and_then(|u| u.as_str()))
                .filter(|u| !u.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
