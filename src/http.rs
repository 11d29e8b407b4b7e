//! HTTP plumbing shared by the source adapters.
//!
//! Every provider call goes through [`get_json`], which turns transport
//! errors and non-success statuses into a [`SourceFailure`]. Providers
//! disagree about which status means "slow down" and which means "bad
//! key", so each adapter passes its own [`StatusPolicy`].

use anyhow::Result;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;

use crate::traits::SourceFailure;

/// Provider-specific meaning of error statuses.
#[derive(Debug, Clone, Copy)]
pub struct StatusPolicy {
    pub rate_limited: &'static [u16],
    pub unauthorized: &'static [u16],
}

/// Builds a client whose every request is bounded by `timeout_secs`.
pub fn build_client(timeout_secs: u64, user_agent: Option<&str>) -> Result<Client> {
    let mut builder = Client::builder().timeout(Duration::from_secs(timeout_secs));
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua.to_string());
    }
    Ok(builder.build()?)
}

/// Maps a response status to a failure, or `None` for success.
pub fn classify_status(status: StatusCode, policy: &StatusPolicy) -> Option<SourceFailure> {
    if status.is_success() {
        return None;
    }

    let code = status.as_u16();
    if policy.rate_limited.contains(&code) {
        Some(SourceFailure::RateLimited)
    } else if policy.unauthorized.contains(&code) {
        Some(SourceFailure::Unauthorized)
    } else {
        Some(SourceFailure::Status(code))
    }
}

/// Maps a reqwest error to a failure. The request URL is dropped from the
/// message since some providers take the API key as a query parameter.
pub fn classify_transport(err: reqwest::Error) -> SourceFailure {
    if err.is_timeout() {
        SourceFailure::Timeout
    } else if err.is_decode() {
        SourceFailure::Malformed(err.without_url().to_string())
    } else {
        SourceFailure::Transport(err.without_url().to_string())
    }
}

/// Sends the request and parses a JSON body.
pub async fn get_json(
    request: RequestBuilder,
    policy: &StatusPolicy,
) -> std::result::Result<serde_json::Value, SourceFailure> {
    let response = request.send().await.map_err(classify_transport)?;

    if let Some(failure) = classify_status(response.status(), policy) {
        return Err(failure);
    }

    response
        .json::<serde_json::Value>()
        .await
        .map_err(classify_transport)
}

/// Logs a degraded source call at a level matching its cause.
pub fn log_failure(source: &str, term: &str, failure: &SourceFailure) {
    match failure {
        SourceFailure::RateLimited => {
            tracing::warn!(source, term, "rate limit exceeded, skipping source")
        }
        SourceFailure::Unauthorized => {
            tracing::error!(source, term, "API key rejected by provider")
        }
        SourceFailure::MissingKey => {
            tracing::debug!(source, term, "API key not configured, skipping source")
        }
        SourceFailure::Timeout => tracing::warn!(source, term, "request timed out"),
        other => tracing::error!(source, term, error = %other, "source request failed"),
    }
}
