//! Trait definition for pluggable search provider adapters.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::SearchResult;

/// Options applied to one search request.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Maximum results requested from each provider. `None` leaves the
    /// provider's own default in place.
    pub max_results: Option<usize>,
    /// Whether to enrich results with fetched-and-summarised page content.
    pub fetch_content: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: Some(10),
            fetch_content: false,
        }
    }
}

impl SearchOptions {
    /// Options with the given result cap and no enrichment.
    pub fn with_max_results(max_results: usize) -> Self {
        Self {
            max_results: Some(max_results),
            ..Self::default()
        }
    }
}

/// A search provider adapter.
///
/// Implementors map a query plus [`SearchOptions`] to one provider call
/// (API request or HTML scrape) and parse the response into normalised
/// [`SearchResult`] values. No retry, backoff, or pagination: a failed
/// call returns `Err` and the orchestrator decides what that means.
///
/// Object-safe so the orchestrator can hold a registry of boxed engines.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Perform a search and return parsed results in provider order.
    ///
    /// # Errors
    ///
    /// Any HTTP failure, non-2xx status, or undecodable response.
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>>;

    /// Provider display name, used as `source_engine` on results.
    fn name(&self) -> &'static str;
}
