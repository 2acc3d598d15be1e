//! # omnisearch
//!
//! A meta-search aggregation service. One authenticated HTTP endpoint
//! accepts a query, fans it out to the requested providers (scraped
//! DuckDuckGo, Google Custom Search, Bing Web Search), optionally
//! enriches each result with fetched-and-summarised page content via a
//! chat-completion model, merges everything into one list, and caches
//! the merged response for a short TTL.
//!
//! ## Design
//!
//! - Provider adapters behind an object-safe [`engine::SearchEngine`]
//!   trait; no retry or backoff — a failed provider is isolated at the
//!   orchestrator and contributes zero results
//! - [`orchestrator::OmniSearchService`] assigns engine-local result
//!   indices and runs enrichment concurrently with a wait-for-all barrier
//! - In-memory TTL cache keyed by a digest of the request signature
//! - Bearer-token auth, enabled only when an API key is configured

pub mod cache;
pub mod config;
pub mod content;
pub mod engine;
pub mod engines;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod llm;
pub mod orchestrator;
pub mod server;
pub mod types;

pub use config::{SearchEngineConfig, ServiceConfig};
pub use engine::{SearchEngine, SearchOptions};
pub use error::{OmniError, Result};
pub use orchestrator::OmniSearchService;
pub use types::{FetchedContent, SearchResult};
