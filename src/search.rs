//! The search request pipeline shared by `POST /search` and `bloom search`.

use anyhow::{anyhow, Result};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use thiserror::Error;

use crate::aggregate::{panic_message, AggregateOutcome, Aggregator};
use crate::classify::is_flower_related;
use crate::config::{Config, SearchConfig};
use crate::models::CompositeResult;
use crate::normalize::normalize;
use crate::suggest::suggestions_for;

/// Why a search produced no composite result.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Enter at least {min} characters")]
    QueryTooShort { min: usize },
    #[error("No flower found matching \"{query}\"")]
    NotRelevant {
        query: String,
        suggestions: Vec<String>,
    },
    #[error("No results found for a flower with that name")]
    NotFound { suggestions: Vec<String> },
    #[error("An error occurred while searching for flower information")]
    Internal(#[from] anyhow::Error),
}

impl SearchError {
    pub fn suggestions(&self) -> &[String] {
        match self {
            SearchError::NotRelevant { suggestions, .. } | SearchError::NotFound { suggestions } => {
                suggestions
            }
            SearchError::QueryTooShort { .. } | SearchError::Internal(_) => &[],
        }
    }
}

/// Validates, normalizes and classifies `query`, then aggregates all
/// sources for it.
pub async fn search_flowers(
    aggregator: &Aggregator,
    config: &SearchConfig,
    query: &str,
) -> std::result::Result<CompositeResult, SearchError> {
    let query = query.trim();
    if query.chars().count() < config.min_query_chars {
        return Err(SearchError::QueryTooShort {
            min: config.min_query_chars,
        });
    }

    let term = normalize(query).ok_or(SearchError::QueryTooShort {
        min: config.min_query_chars,
    })?;

    if !is_flower_related(&term) {
        tracing::info!(query, term = %term, "query is not flower-related");
        return Err(SearchError::NotRelevant {
            query: query.to_string(),
            suggestions: suggestions_for(&term),
        });
    }

    tracing::info!(query, term = %term, "searching sources");
    // Adapter panics are contained per source; anything that still unwinds
    // here is a fault in orchestration itself.
    let outcome = AssertUnwindSafe(aggregator.search(query, &term))
        .catch_unwind()
        .await
        .map_err(|panic| anyhow!("search orchestration panicked: {}", panic_message(&*panic)))?;

    match outcome {
        AggregateOutcome::Found(result) => Ok(*result),
        AggregateOutcome::NotFound { suggestions } => Err(SearchError::NotFound { suggestions }),
    }
}

/// CLI entry point: runs one search and prints the composite as JSON.
pub async fn run_search(config: &Config, query: &str) -> Result<()> {
    let aggregator = Aggregator::from_config(config)?;

    match search_flowers(&aggregator, &config.search, query).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(SearchError::Internal(e)) => Err(e),
        Err(e) => {
            println!("{}", e);
            let suggestions = e.suggestions();
            if !suggestions.is_empty() {
                println!("Did you mean: {}", suggestions.join(", "));
            }
            anyhow::bail!("search failed: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EncyclopediaRecord, PlantRecord};
    use crate::traits::{Source, SourceFailure, SourceOutcome, SourceSet};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns nothing and counts calls.
    struct Silent<T> {
        calls: Arc<AtomicUsize>,
        _marker: std::marker::PhantomData<fn() -> T>,
    }

    #[async_trait]
    impl<T: Send + 'static> Source for Silent<T> {
        type Output = T;

        fn name(&self) -> &str {
            "silent"
        }

        fn description(&self) -> &str {
            "always empty"
        }

        async fn fetch(&self, _term: &str) -> SourceOutcome<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SourceOutcome::Empty
        }
    }

    fn silent<T>(calls: &Arc<AtomicUsize>) -> Silent<T> {
        Silent {
            calls: calls.clone(),
            _marker: std::marker::PhantomData,
        }
    }

    fn aggregator(calls: &Arc<AtomicUsize>) -> Aggregator {
        let sources = SourceSet {
            botanical: Arc::new(silent::<PlantRecord>(calls)),
            primary_images: Arc::new(silent::<Vec<String>>(calls)),
            secondary_images: Arc::new(silent::<Vec<String>>(calls)),
            encyclopedia: Arc::new(silent::<EncyclopediaRecord>(calls)),
        };
        Aggregator::new(sources, &SearchConfig::default())
    }

    #[tokio::test]
    async fn test_short_query_rejected_without_fan_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let err = search_flowers(&aggregator(&calls), &SearchConfig::default(), " a ")
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::QueryTooShort { min: 2 }));
        assert!(err.suggestions().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_two_chars_pass_length_check() {
        let calls = Arc::new(AtomicUsize::new(0));
        let err = search_flowers(&aggregator(&calls), &SearchConfig::default(), "ab")
            .await
            .unwrap_err();
        // Accepted by the length check, then rejected as off-topic.
        assert!(matches!(err, SearchError::NotRelevant { .. }));
    }

    #[tokio::test]
    async fn test_unrelated_query_gets_suggestions() {
        let calls = Arc::new(AtomicUsize::new(0));
        let err = search_flowers(&aggregator(&calls), &SearchConfig::default(), "xyzabc")
            .await
            .unwrap_err();
        match &err {
            SearchError::NotRelevant { query, suggestions } => {
                assert_eq!(query, "xyzabc");
                assert!(!suggestions.is_empty());
            }
            other => panic!("expected NotRelevant, got {:?}", other),
        }
        assert_eq!(err.to_string(), "No flower found matching \"xyzabc\"");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    /// Fails like a rate-limited provider, then cannot report its own name
    /// when the failure is logged.
    struct Nameless;

    #[async_trait]
    impl Source for Nameless {
        type Output = PlantRecord;

        fn name(&self) -> &str {
            panic!("name table corrupted")
        }

        fn description(&self) -> &str {
            "broken"
        }

        async fn fetch(&self, _term: &str) -> SourceOutcome<PlantRecord> {
            SourceOutcome::Failed(SourceFailure::RateLimited)
        }
    }

    #[tokio::test]
    async fn test_orchestration_fault_is_internal_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sources = SourceSet {
            botanical: Arc::new(Nameless),
            primary_images: Arc::new(silent::<Vec<String>>(&calls)),
            secondary_images: Arc::new(silent::<Vec<String>>(&calls)),
            encyclopedia: Arc::new(silent::<EncyclopediaRecord>(&calls)),
        };
        let aggregator = Aggregator::new(sources, &SearchConfig::default());

        let err = search_flowers(&aggregator, &SearchConfig::default(), "rosa")
            .await
            .unwrap_err();
        match &err {
            SearchError::Internal(inner) => {
                assert!(inner.to_string().contains("name table corrupted"));
            }
            other => panic!("expected Internal, got {:?}", other),
        }
        // The caller only ever sees the generic message.
        assert_eq!(
            err.to_string(),
            "An error occurred while searching for flower information"
        );
        assert!(err.suggestions().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_found_after_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let err = search_flowers(&aggregator(&calls), &SearchConfig::default(), "peonia")
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::NotFound { .. }));
        assert!(!err.suggestions().is_empty());
        // Two passes of four calls each.
        assert_eq!(calls.load(Ordering::SeqCst), 8);
    }
}
