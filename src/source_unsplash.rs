//! Unsplash image source.
//!
//! Authenticates with a `Client-ID` header and returns the `regular` size
//! URL of each photo matching `"{term} flower"`.
//!
//! Status handling: `429` is a rate limit, `401`/`403` an invalid or
//! revoked key.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::UnsplashConfig;
use crate::http::{build_client, get_json, StatusPolicy};
use crate::traits::{Source, SourceFailure, SourceOutcome};

const POLICY: StatusPolicy = StatusPolicy {
    rate_limited: &[429],
    unauthorized: &[401, 403],
};

pub struct UnsplashSource {
    client: Client,
    url: String,
    per_page: u32,
    api_key: Option<String>,
}

impl UnsplashSource {
    pub fn new(config: &UnsplashConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs, None)?,
            url: config.url.clone(),
            per_page: config.per_page,
            api_key: config.resolve_api_key(),
        })
    }
}

#[async_trait]
impl Source for UnsplashSource {
    type Output = Vec<String>;

    fn name(&self) -> &str {
        "unsplash"
    }

    fn description(&self) -> &str {
        "Flower photos from Unsplash"
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
        let request = self
            .client
            .get(&self.url)
            .header("Authorization", format!("Client-ID {}", key))
            .header("Accept-Version", "v1")
            .query(&[
                ("query", query.as_str()),
                ("content_filter", "high"),
                ("per_page", per_page.as_str()),
            ]);

        match get_json(request, &POLICY).await {
            Ok(json) => SourceOutcome::from_items(photo_urls(&json)),
            Err(failure) => SourceOutcome::Failed(failure),
        }
    }
}

/// Extracts `results[].urls.regular`.
pub fn photo_urls(json: &Value) -> Vec<String> {
    json.get("results")
        .and_then(|r| r.as_array())
        .map(|results| {
            results
                .iter()
                .filter_map(|photo| photo.pointer("/urls/regular").and_then(|u| u.as_str()))
                .filter(|u| !u.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
