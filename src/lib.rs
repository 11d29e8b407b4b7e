//! # BloomHub
//!
//! A flower search service that aggregates botanical data, photos, and
//! encyclopedia summaries from four external providers behind one endpoint.
//!
//! A query is normalized (accents, plurals, synonyms), checked for flower
//! relevance, and fanned out concurrently to every source. Whatever comes
//! back is merged into a single composite result with per-source
//! provenance. If nothing comes back, the search is retried once with the
//! flower's scientific name.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌────────────┐   ┌──────────────┐
//! │  Query   │──▶│ Normalize + │──▶│ Aggregator │──▶│  Composite   │
//! │          │   │  Classify   │   │  (fan-out) │   │   result     │
//! └──────────┘   └─────────────┘   └─────┬──────┘   └──────────────┘
//!                                        │
//!                ┌──────────┬────────────┼───────────┐
//!                ▼          ▼            ▼           ▼
//!           Perenual     Pixabay     Unsplash    Wikipedia
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! bloom init                          # create database
//! bloom user add --name Ana --email ana@example.com --password secreto
//! bloom search "peonías"              # one-off search, prints JSON
//! bloom serve                         # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`vocabulary`] | Keyword, synonym and scientific-name tables |
//! | [`normalize`] | Query normalization and scientific names |
//! | [`classify`] | Flower-relevance classifier |
//! | [`suggest`] | Alternative query suggestions |
//! | [`traits`] | Source adapter trait and outcomes |
//! | [`http`] | Shared HTTP client plumbing |
//! | [`enhance`] | Merging botanical and encyclopedia records |
//! | [`aggregate`] | Concurrent fan-out and retry |
//! | [`search`] | Search pipeline and CLI entry point |
//! | [`auth`] | Accounts, sessions, cookie signing |
//! | [`server`] | HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod aggregate;
pub mod auth;
pub mod classify;
pub mod config;
pub mod db;
pub mod enhance;
pub mod http;
pub mod migrate;
pub mod models;
pub mod normalize;
pub mod search;
pub mod server;
pub mod source_perenual;
pub mod source_pixabay;
pub mod source_unsplash;
pub mod source_wikipedia;
pub mod sources;
pub mod suggest;
pub mod traits;
pub mod vocabulary;
