//! Source adapter trait and the tagged outcome every adapter returns.
//!
//! Each external provider (plant database, two image searches, the
//! encyclopedia) is wrapped in a [`Source`] implementation. Adapters never
//! return `Err` and never panic: every failure path resolves to
//! [`SourceOutcome::Failed`] with a [`SourceFailure`] describing why, so the
//! aggregator's "did anything come back" check is a plain predicate.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  SourceSet                   │
//! │ ┌──────────┐ ┌─────────┐ ┌────────┐ ┌──────┐ │
//! │ │ Perenual │ │ Pixabay │ │Unsplash│ │ Wiki │ │
//! │ └──────────┘ └─────────┘ └────────┘ └──────┘ │
//! └──────────────────────┬───────────────────────┘
//!                        ▼
//!             Aggregator::search() → CompositeResult
//! ```
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use bloomhub::traits::{Source, SourceOutcome};
//!
//! pub struct FixedImages(Vec<String>);
//!
//! #[async_trait]
//! impl Source for FixedImages {
//!     type Output = Vec<String>;
//!
//!     fn name(&self) -> &str { "fixed" }
//!     fn description(&self) -> &str { "Serves a fixed image list" }
//!
//!     async fn fetch(&self, _term: &str) -> SourceOutcome<Vec<String>> {
//!         SourceOutcome::from_items(self.0.clone())
//!     }
//! }
//! ```

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::models::{EncyclopediaRecord, PlantRecord};
use crate::source_perenual::PerenualSource;
use crate::source_pixabay::PixabaySource;
use crate::source_unsplash::UnsplashSource;
use crate::source_wikipedia::WikipediaSource;

// ═══════════════════════════════════════════════════════════════════════
// Outcome types
// ═══════════════════════════════════════════════════════════════════════

/// Why an adapter produced no data.
///
/// Rate limits and bad credentials are kept apart from generic failures so
/// they can be logged distinctly; all of them degrade to "absent".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceFailure {
    #[error("request timed out")]
    Timeout,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("API key rejected")]
    Unauthorized,
    #[error("API key not configured")]
    MissingKey,
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result of one adapter call: data, a successful empty answer, or a
/// failure that has already been degraded to "no data".
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome<T> {
    Found(T),
    Empty,
    Failed(SourceFailure),
}

impl<T> SourceOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, SourceOutcome::Found(_))
    }

    /// Collapses the outcome to the value, discarding the reason for absence.
    pub fn found(self) -> Option<T> {
        match self {
            SourceOutcome::Found(v) => Some(v),
            SourceOutcome::Empty | SourceOutcome::Failed(_) => None,
        }
    }

    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => SourceOutcome::Found(v),
            None => SourceOutcome::Empty,
        }
    }
}

impl<I> SourceOutcome<Vec<I>> {
    /// `Found` for a non-empty list, `Empty` otherwise.
    pub fn from_items(items: Vec<I>) -> Self {
        if items.is_empty() {
            SourceOutcome::Empty
        } else {
            SourceOutcome::Found(items)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Source trait
// ═══════════════════════════════════════════════════════════════════════

/// An external data provider queried once per search pass.
///
/// Implementations must bound their own network time, classify provider
/// errors into [`SourceFailure`], and filter off-topic items where the
/// provider may return them.
#[async_trait]
pub trait Source: Send + Sync {
    /// The partial record this source contributes.
    type Output: Send;

    /// Short identifier used in logs and provenance (e.g. `"perenual"`).
    fn name(&self) -> &str;

    /// One-line description for `bloom sources`.
    fn description(&self) -> &str;

    /// Whether the source has what it needs (credentials) to make calls.
    fn is_configured(&self) -> bool {
        true
    }

    /// Query the provider for a normalized term.
    async fn fetch(&self, term: &str) -> SourceOutcome<Self::Output>;
}

pub type BotanicalSource = Arc<dyn Source<Output = PlantRecord>>;
pub type ImageSource = Arc<dyn Source<Output = Vec<String>>>;
pub type EncyclopediaSource = Arc<dyn Source<Output = EncyclopediaRecord>>;

/// The four adapters a search pass fans out to.
///
/// Image results are concatenated in field order: `primary_images` first,
/// then `secondary_images`.
#[derive(Clone)]
pub struct SourceSet {
    pub botanical: BotanicalSource,
    pub primary_images: ImageSource,
    pub secondary_images: ImageSource,
    pub encyclopedia: EncyclopediaSource,
}

/// Configuration status of one adapter, as listed by `bloom sources`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    pub name: String,
    pub description: String,
    pub configured: bool,
}

impl SourceSet {
    /// Builds the HTTP-backed adapters from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            botanical: Arc::new(PerenualSource::new(&config.sources.perenual)?),
            primary_images: Arc::new(PixabaySource::new(&config.sources.pixabay)?),
            secondary_images: Arc::new(UnsplashSource::new(&config.sources.unsplash)?),
            encyclopedia: Arc::new(WikipediaSource::new(&config.sources.wikipedia)?),
        })
    }

    pub fn statuses(&self) -> Vec<SourceStatus> {
        fn status<T: Send + 'static>(s: &Arc<dyn Source<Output = T>>) -> SourceStatus {
            SourceStatus {
                name: s.name().to_string(),
                description: s.description().to_string(),
                configured: s.is_configured(),
            }
        }

        vec![
            status(&self.botanical),
            status(&self.primary_images),
            status(&self.secondary_images),
            status(&self.encyclopedia),
        ]
    }
}
