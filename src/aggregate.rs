//! Search orchestration: fan out to every source, merge, retry once.
//!
//! # Pass
//!
//! One pass queries the four adapters of a [`SourceSet`] concurrently with
//! `tokio::join!`. Every call holds a permit from a process-wide semaphore
//! (the bounded worker pool shared by all requests) and is cut off after
//! the configured deadline, which turns into [`SourceFailure::Timeout`].
//! The pass completes when all four calls have resolved.
//!
//! # Retry
//!
//! If no adapter returned data and the term's scientific name differs from
//! the term, the scientific name is re-normalized and a second pass runs
//! after the first. Otherwise, or if the second pass is empty too, the
//! outcome is [`AggregateOutcome::NotFound`] with suggestions for the
//! original term.

use anyhow::Result;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::config::{Config, SearchConfig};
use crate::enhance::enhance;
use crate::http::log_failure;
use crate::models::{CompositeResult, EncyclopediaRecord, PlantRecord, Provenance};
use crate::normalize::{normalize, scientific_name};
use crate::suggest::suggestions_for;
use crate::traits::{Source, SourceFailure, SourceOutcome, SourceSet};

/// Result of [`Aggregator::search`].
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOutcome {
    Found(Box<CompositeResult>),
    NotFound { suggestions: Vec<String> },
}

/// Raw outcomes of one four-way fan-out.
struct Pass {
    plant: SourceOutcome<PlantRecord>,
    primary_images: SourceOutcome<Vec<String>>,
    secondary_images: SourceOutcome<Vec<String>>,
    encyclopedia: SourceOutcome<EncyclopediaRecord>,
}

impl Pass {
    fn provenance(&self) -> Provenance {
        Provenance {
            perenual: self.plant.is_found(),
            pixabay: self.primary_images.is_found(),
            unsplash: self.secondary_images.is_found(),
            wikipedia: self.encyclopedia.is_found(),
        }
    }
}

#[derive(Clone)]
pub struct Aggregator {
    sources: SourceSet,
    permits: Arc<Semaphore>,
    deadline: Duration,
    max_images: usize,
}

impl Aggregator {
    pub fn new(sources: SourceSet, search: &SearchConfig) -> Self {
        Self {
            sources,
            permits: Arc::new(Semaphore::new(search.max_concurrent_fetches)),
            deadline: search.source_deadline(),
            max_images: search.max_images,
        }
    }

    /// Builds the aggregator over the HTTP-backed sources.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(SourceSet::from_config(config)?, &config.search))
    }

    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }

    /// Searches every source for `term` (already normalized and classified).
    ///
    /// `query` is the raw user query; it is echoed in the result and used
    /// as the display-name fallback.
    pub async fn search(&self, query: &str, term: &str) -> AggregateOutcome {
        let first = self.run_pass(term).await;
        if first.provenance().any() {
            return AggregateOutcome::Found(Box::new(self.compose(first, query, term, query)));
        }

        let scientific = scientific_name(term);
        if scientific != term {
            let retry_term = normalize(&scientific).unwrap_or_else(|| scientific.clone());
            tracing::info!(term, retry_term = %retry_term, "no source returned data, retrying with scientific name");

            let retry = self.run_pass(&retry_term).await;
            if retry.provenance().any() {
                return AggregateOutcome::Found(Box::new(self.compose(
                    retry,
                    query,
                    &retry_term,
                    &scientific,
                )));
            }
        }

        tracing::info!(term, "no source returned data");
        AggregateOutcome::NotFound {
            suggestions: suggestions_for(term),
        }
    }

    async fn run_pass(&self, term: &str) -> Pass {
        let (plant, primary_images, secondary_images, encyclopedia) = tokio::join!(
            self.call(&*self.sources.botanical, term),
            self.call(&*self.sources.primary_images, term),
            self.call(&*self.sources.secondary_images, term),
            self.call(&*self.sources.encyclopedia, term),
        );

        Pass {
            plant,
            primary_images,
            secondary_images,
            encyclopedia,
        }
    }

    /// One adapter call under a pool permit and the per-call deadline.
    ///
    /// A panicking adapter degrades to [`SourceFailure::Internal`] for that
    /// source alone; the other calls of the pass keep their results.
    async fn call<T: Send>(&self, source: &dyn Source<Output = T>, term: &str) -> SourceOutcome<T> {
        let guarded = AssertUnwindSafe(source.fetch(term)).catch_unwind();
        let outcome = match self.permits.acquire().await {
            Ok(_permit) => match tokio::time::timeout(self.deadline, guarded).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(panic)) => SourceOutcome::Failed(SourceFailure::Internal(format!(
                    "adapter panicked: {}",
                    panic_message(&*panic)
                ))),
                Err(_) => SourceOutcome::Failed(SourceFailure::Timeout),
            },
            Err(_) => SourceOutcome::Failed(SourceFailure::Internal("worker pool closed".into())),
        };

        match &outcome {
            SourceOutcome::Failed(failure) => log_failure(source.name(), term, failure),
            SourceOutcome::Empty => tracing::debug!(source = source.name(), term, "no results"),
            SourceOutcome::Found(_) => tracing::debug!(source = source.name(), term, "results found"),
        }
        outcome
    }

    fn compose(&self, pass: Pass, query: &str, term: &str, enhancer_query: &str) -> CompositeResult {
        let sources = pass.provenance();

        let mut images = pass.primary_images.found().unwrap_or_default();
        images.extend(pass.secondary_images.found().unwrap_or_default());
        images.truncate(self.max_images);

        let wikipedia = pass.encyclopedia.found();
        let plant_info = enhance(pass.plant.found(), wikipedia.as_ref(), enhancer_query);

        CompositeResult {
            plant_info,
            images,
            wikipedia,
            query: query.to_string(),
            normalized_query: term.to_string(),
            sources,
        }
    }
}

/// Text of a panic payload, for logs. `panic!` payloads are `&str` or
/// `String`; anything else is reported generically.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}
