//! Integration tests for the HTTP source adapters.
//!
//! Each adapter is pointed at a `wiremock` server standing in for its
//! provider, so request shapes, status classification, and response
//! mapping are exercised over real HTTP.

use bloomhub::config::{PerenualConfig, PixabayConfig, UnsplashConfig, WikipediaConfig};
use bloomhub::source_perenual::PerenualSource;
use bloomhub::source_pixabay::PixabaySource;
use bloomhub::source_unsplash::UnsplashSource;
use bloomhub::source_wikipedia::WikipediaSource;
use bloomhub::traits::{Source, SourceFailure, SourceOutcome};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UNSET_ENV: &str = "BLOOMHUB_TEST_UNSET_KEY";

// ─── Helpers ────────────────────────────────────────────────────────

fn perenual(server: &MockServer, key: Option<&str>) -> PerenualSource {
    PerenualSource::new(&PerenualConfig {
        url: format!("{}/api/species-list", server.uri()),
        timeout_secs: 2,
        api_key: key.map(String::from),
        api_key_env: UNSET_ENV.to_string(),
    })
    .unwrap()
}

fn pixabay(server: &MockServer, timeout_secs: u64) -> PixabaySource {
    PixabaySource::new(&PixabayConfig {
        url: format!("{}/api/", server.uri()),
        timeout_secs,
        per_page: 3,
        api_key: Some("px-key".to_string()),
        api_key_env: UNSET_ENV.to_string(),
    })
    .unwrap()
}

fn unsplash(server: &MockServer) -> UnsplashSource {
    UnsplashSource::new(&UnsplashConfig {
        url: format!("{}/search/photos", server.uri()),
        timeout_secs: 2,
        per_page: 3,
        api_key: Some("un-key".to_string()),
        api_key_env: UNSET_ENV.to_string(),
    })
    .unwrap()
}

fn wikipedia(server: &MockServer) -> WikipediaSource {
    WikipediaSource::new(&WikipediaConfig {
        url: format!("{}/w/api.php", server.uri()),
        timeout_secs: 2,
        ..WikipediaConfig::default()
    })
    .unwrap()
}

fn wiki_missing(title: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({ "query": { "pages": [ { "title": title, "missing": true } ] } }))
}

fn wiki_page(title: &str, extract: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "query": { "pages": [ {
            "pageid": 7,
            "title": title,
            "extract": extract,
            "fullurl": format!("https://es.wikipedia.org/wiki/{}", title)
        } ] }
    }))
}

// ─── Perenual ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_perenual_maps_first_flower() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/species-list"))
        .and(query_param("key", "pe-key"))
        .and(query_param("q", "rosa"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "common_name": "Oak", "scientific_name": ["Quercus robur"] },
                { "common_name": "Rose", "scientific_name": ["Rosa canina"],
                  "watering": "Average", "cycle": "Perennial",
                  "sunlight": ["full sun", "part shade"] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = perenual(&server, Some("pe-key")).fetch("rosa").await;
    let record = outcome.found().expect("expected a plant record");
    assert_eq!(record.name.as_deref(), Some("Rose"));
    assert_eq!(record.scientific_name.as_deref(), Some("Rosa canina"));
    assert_eq!(record.cycle.as_deref(), Some("Perennial"));
}

#[tokio::test]
async fn test_perenual_only_off_topic_species_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "common_name": "Carrot" }, { "common_name": "Oak" } ]
        })))
        .mount(&server)
        .await;

    let outcome = perenual(&server, Some("pe-key")).fetch("rosa").await;
    assert_eq!(outcome, SourceOutcome::Empty);
}

#[tokio::test]
async fn test_perenual_rate_limit_and_bad_key_are_distinct() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("key", "limited"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("key", "revoked"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert_eq!(
        perenual(&server, Some("limited")).fetch("rosa").await,
        SourceOutcome::Failed(SourceFailure::RateLimited)
    );
    assert_eq!(
        perenual(&server, Some("revoked")).fetch("rosa").await,
        SourceOutcome::Failed(SourceFailure::Unauthorized)
    );
}

#[tokio::test]
async fn test_perenual_without_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let source = perenual(&server, None);
    assert!(!source.is_configured());
    assert_eq!(
        source.fetch("rosa").await,
        SourceOutcome::Failed(SourceFailure::MissingKey)
    );
}

// ─── Pixabay ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pixabay_returns_image_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("key", "px-key"))
        .and(query_param("q", "tulipán flower"))
        .and(query_param("image_type", "photo"))
        .and(query_param("per_page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "hits": [
                { "webformatURL": "https://pixabay.test/1.jpg" },
                { "webformatURL": "https://pixabay.test/2.jpg" }
            ]
        })))
        .mount(&server)
        .await;

    let outcome = pixabay(&server, 2).fetch("tulipán").await;
    assert_eq!(
        outcome,
        SourceOutcome::Found(vec![
            "https://pixabay.test/1.jpg".to_string(),
            "https://pixabay.test/2.jpg".to_string(),
        ])
    );
}

#[tokio::test]
async fn test_pixabay_no_hits_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 0, "hits": [] })))
        .mount(&server)
        .await;

    assert_eq!(pixabay(&server, 2).fetch("rosa").await, SourceOutcome::Empty);
}

#[tokio::test]
async fn test_pixabay_forbidden_is_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    assert_eq!(
        pixabay(&server, 2).fetch("rosa").await,
        SourceOutcome::Failed(SourceFailure::Unauthorized)
    );
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "hits": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    assert_eq!(
        pixabay(&server, 1).fetch("rosa").await,
        SourceOutcome::Failed(SourceFailure::Timeout)
    );
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let outcome = pixabay(&server, 2).fetch("rosa").await;
    assert!(
        matches!(outcome, SourceOutcome::Failed(SourceFailure::Malformed(_))),
        "got {:?}",
        outcome
    );
}

// ─── Unsplash ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_unsplash_sends_client_id_and_maps_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(header("Authorization", "Client-ID un-key"))
        .and(header("Accept-Version", "v1"))
        .and(query_param("query", "girasol flower"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "urls": { "regular": "https://unsplash.test/a.jpg" } },
                { "urls": { "small": "https://unsplash.test/b-small.jpg" } }
            ]
        })))
        .mount(&server)
        .await;

    assert_eq!(
        unsplash(&server).fetch("girasol").await,
        SourceOutcome::Found(vec!["https://unsplash.test/a.jpg".to_string()])
    );
}

#[tokio::test]
async fn test_unsplash_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    assert_eq!(
        unsplash(&server).fetch("girasol").await,
        SourceOutcome::Failed(SourceFailure::RateLimited)
    );
}

// ─── Wikipedia ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_wikipedia_prefers_disambiguated_flower_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("titles", "dalia (flor)"))
        .respond_with(wiki_page(
            "Dahlia",
            "Dahlia es un género de plantas con flor.\n\n== Descripción ==\nDetalles.",
        ))
        .mount(&server)
        .await;

    let record = wikipedia(&server).fetch("dalia").await.found().unwrap();
    assert_eq!(record.title, "Dahlia");
    assert_eq!(record.summary.as_deref(), Some("Dahlia es un género de plantas con flor."));
    assert_eq!(record.url.as_deref(), Some("https://es.wikipedia.org/wiki/Dahlia"));
    assert!(record.extract.unwrap().contains("== Descripción =="));
}

#[tokio::test]
async fn test_wikipedia_falls_back_to_scientific_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("titles", "peonía (flor)"))
        .respond_with(wiki_missing("peonía (flor)"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("titles", "peonía"))
        .respond_with(wiki_missing("peonía"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("titles", "Paeonia"))
        .respond_with(wiki_page("Paeonia", "Paeonia es un género de plantas con flores vistosas."))
        .expect(1)
        .mount(&server)
        .await;

    let record = wikipedia(&server).fetch("peonía").await.found().unwrap();
    assert_eq!(record.title, "Paeonia");
}

#[tokio::test]
async fn test_wikipedia_missing_everywhere_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(wiki_missing("whatever"))
        .mount(&server)
        .await;

    assert_eq!(wikipedia(&server).fetch("lirio").await, SourceOutcome::Empty);
}

#[tokio::test]
async fn test_wikipedia_off_topic_page_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(wiki_page(
            "Calculadora",
            "Una calculadora es un dispositivo para operaciones aritméticas.",
        ))
        .mount(&server)
        .await;

    assert_eq!(wikipedia(&server).fetch("lirio").await, SourceOutcome::Empty);
}

#[tokio::test]
async fn test_wikipedia_server_error_degrades() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert_eq!(
        wikipedia(&server).fetch("lirio").await,
        SourceOutcome::Failed(SourceFailure::Status(503))
    );
}
