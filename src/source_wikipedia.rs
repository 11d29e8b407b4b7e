//! Wikipedia encyclopedia source.
//!
//! Uses the MediaWiki `action=query` API (plain-text extracts plus the
//! canonical page URL). Flower articles are often disambiguated, so pages
//! are tried in order:
//!
//! 1. `"{term} (flor)"`
//! 2. `"{term}"`
//! 3. the scientific name of `term`, when it has one
//!
//! The first page that exists is kept only if its summary or title is
//! flower-related.
//!
//! # Configuration
//!
//! ```toml
//! [sources.wikipedia]
//! url = "https://es.wikipedia.org/w/api.php"
//! user_agent = "BloomHub/3.0"
//! summary_chars = 500
//! extract_chars = 1000
//! ```

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::classify::is_flower_related;
use crate::config::WikipediaConfig;
use crate::http::{build_client, get_json, StatusPolicy};
use crate::models::EncyclopediaRecord;
use crate::normalize::scientific_name;
use crate::traits::{Source, SourceFailure, SourceOutcome};

const POLICY: StatusPolicy = StatusPolicy {
    rate_limited: &[429],
    unauthorized: &[401, 403],
};

const ELLIPSIS: &str = "...";

pub struct WikipediaSource {
    client: Client,
    url: String,
    summary_chars: usize,
    extract_chars: usize,
}

/// A page as returned by the query API.
#[derive(Debug, Clone, PartialEq)]
pub struct WikiPage {
    pub title: String,
    pub text: String,
    pub url: Option<String>,
}

impl WikiPage {
    /// The lead section: everything before the first section heading.
    pub fn summary(&self) -> &str {
        let end = self.text.find("\n==").unwrap_or(self.text.len());
        self.text[..end].trim()
    }
}

impl WikipediaSource {
    pub fn new(config: &WikipediaConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs, Some(&config.user_agent))?,
            url: config.url.clone(),
            summary_chars: config.summary_chars,
            extract_chars: config.extract_chars,
        })
    }

    async fn lookup(&self, title: &str) -> std::result::Result<Option<WikiPage>, SourceFailure> {
        let request = self.client.get(&self.url).query(&[
            ("action", "query"),
            ("format", "json"),
            ("formatversion", "2"),
            ("prop", "extracts|info"),
            ("explaintext", "1"),
            ("inprop", "url"),
            ("redirects", "1"),
            ("titles", title),
        ]);

        let json = get_json(request, &POLICY).await?;
        Ok(parse_page(&json))
    }

    /// Walks the candidate titles and returns the first existing page.
    async fn find_page(&self, term: &str) -> std::result::Result<Option<WikiPage>, SourceFailure> {
        if let Some(page) = self.lookup(&format!("{} (flor)", term)).await? {
            return Ok(Some(page));
        }
        if let Some(page) = self.lookup(term).await? {
            return Ok(Some(page));
        }

        let scientific = scientific_name(term);
        if scientific != term {
            return self.lookup(&scientific).await;
        }
        Ok(None)
    }

    fn to_record(&self, page: &WikiPage) -> EncyclopediaRecord {
        let summary = page.summary();
        let summary = if summary.is_empty() {
            None
        } else if summary.chars().count() > self.summary_chars {
            Some(format!("{}{}", truncate_chars(summary, self.summary_chars), ELLIPSIS))
        } else {
            Some(summary.to_string())
        };

        let extract = if page.text.is_empty() {
            None
        } else {
            Some(truncate_chars(&page.text, self.extract_chars).to_string())
        };

        EncyclopediaRecord {
            title: page.title.clone(),
            summary,
            url: page.url.clone(),
            extract,
        }
    }
}

#[async_trait]
impl Source for WikipediaSource {
    type Output = EncyclopediaRecord;

    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Encyclopedia summary from Wikipedia"
    }

    async fn fetch(&self, term: &str) -> SourceOutcome<EncyclopediaRecord> {
        let page = match self.find_page(term).await {
            Ok(Some(page)) => page,
            Ok(None) => return SourceOutcome::Empty,
            Err(failure) => return SourceOutcome::Failed(failure),
        };

        if !is_flower_related(page.summary()) && !is_flower_related(&page.title) {
            tracing::debug!(title = %page.title, "encyclopedia page is off-topic, discarding");
            return SourceOutcome::Empty;
        }

        SourceOutcome::Found(self.to_record(&page))
    }
}

/// Extracts the first page from a `formatversion=2` query response, or
/// `None` if it is missing or invalid.
pub fn parse_page(json: &Value) -> Option<WikiPage> {
    let page = json.pointer("/query/pages")?.as_array()?.first()?;

    let flagged = |key: &str| page.get(key).and_then(|v| v.as_bool()).unwrap_or(false);
    if flagged("missing") || flagged("invalid") {
        return None;
    }

    Some(WikiPage {
        title: page.get("title")?.as_str()?.to_string(),
        text: page
            .get("extract")
            .and_then(|e| e.as_str())
            .unwrap_or_default()
            .to_string(),
        url: page
            .get("fullurl")
            .and_then(|u| u.as_str())
            .map(String::from),
    })
}

/// Cuts `text` to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
