//! Multi-provider search orchestration.
//!
//! [`OmniSearchService`] holds an insertion-ordered registry of named
//! engines, fans a query out to all of them, assigns per-engine result
//! indices, optionally enriches every result with fetched-and-summarised
//! page content, and isolates provider failures so one failing engine
//! never aborts the others.

use std::sync::Arc;

use crate::engine::{SearchEngine, SearchOptions};
use crate::error::{OmniError, Result};
use crate::fetcher::ContentFetcher;
use crate::llm::{ChatMessage, CompletionClient};
use crate::types::SearchResult;

/// System instruction for the enrichment completion. The model replies
/// `None` when the page text carries nothing useful.
const ENRICH_SYSTEM_PROMPT: &str = "You are an HTML data curator. Extract the useful \
information from the HTML text the user provides. Reply with `None` if there is none.";

/// Orchestrates query fan-out across registered engines.
pub struct OmniSearchService {
    /// Registered engines in insertion order. Queried in this order.
    engines: Vec<(String, Box<dyn SearchEngine>)>,
    fetcher: Arc<dyn ContentFetcher>,
    llm: Arc<dyn CompletionClient>,
}

impl OmniSearchService {
    /// Build a service with no engines registered.
    pub fn new(fetcher: Arc<dyn ContentFetcher>, llm: Arc<dyn CompletionClient>) -> Self {
        Self {
            engines: Vec::new(),
            fetcher,
            llm,
        }
    }

    /// Register an engine under a name. Re-registering a name replaces
    /// the engine but keeps its position in the query order.
    pub fn add_engine(&mut self, name: impl Into<String>, engine: Box<dyn SearchEngine>) {
        let name = name.into();
        if let Some(slot) = self.engines.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = engine;
        } else {
            self.engines.push((name, engine));
        }
    }

    /// Names of the registered engines, in query order.
    pub fn engine_names(&self) -> Vec<&str> {
        self.engines.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Fan the query out to every registered engine.
    ///
    /// Engines are queried in insertion order. A failing engine is logged
    /// at warn level and contributes zero results; it does not fail the
    /// request. Each engine's results are numbered `0..n-1` in the order
    /// that engine returned them, independent of other engines. When
    /// `options.fetch_content` is set, every result across all engines is
    /// enriched concurrently before the combined list is returned.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        let mut all_results: Vec<SearchResult> = Vec::new();

        for (name, engine) in &self.engines {
            match engine.search(query, options).await {
                Ok(mut results) => {
                    tracing::debug!(engine = %name, count = results.len(), "engine returned results");
                    for (i, result) in results.iter_mut().enumerate() {
                        result.index = Some(i);
                    }
                    all_results.extend(results);
                }
                Err(error) => {
                    tracing::warn!(engine = %name, %error, "engine query failed");
                }
            }
        }

        if options.fetch_content {
            all_results = self.enrich_all(all_results).await;
        }

        all_results
    }

    /// Query one engine by name, bypassing the fan-out.
    ///
    /// # Errors
    ///
    /// [`OmniError::EngineNotConfigured`] for an unknown name; engine
    /// failures propagate unmodified.
    pub async fn search_by_engine(
        &self,
        engine_name: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        let engine = self
            .engines
            .iter()
            .find(|(n, _)| n == engine_name)
            .map(|(_, e)| e)
            .ok_or_else(|| OmniError::EngineNotConfigured(engine_name.to_owned()))?;

        let mut results = engine.search(query, options).await?;
        for (i, result) in results.iter_mut().enumerate() {
            result.index = Some(i);
        }

        if options.fetch_content {
            results = self.enrich_all(results).await;
        }
        Ok(results)
    }

    /// Enrich every result concurrently with a wait-for-all barrier.
    ///
    /// Never drops a result: per-result failures leave `content` unset.
    async fn enrich_all(&self, results: Vec<SearchResult>) -> Vec<SearchResult> {
        let tasks = results.into_iter().map(|r| self.enrich_one(r));
        futures::future::join_all(tasks).await
    }

    /// Fetch one result's page and summarise it into `content`.
    ///
    /// Fetch or completion failure is logged and the result is returned
    /// unchanged.
    async fn enrich_one(&self, mut result: SearchResult) -> SearchResult {
        let fetched = self.fetcher.fetch(&result.link).await;
        if fetched.is_error() {
            tracing::warn!(link = %result.link, error = %fetched.error, "enrichment fetch failed");
            return result;
        }

        let messages = [
            ChatMessage::system(ENRICH_SYSTEM_PROMPT),
            ChatMessage::user(fetched.clean_text),
        ];
        match self.llm.completion(&messages).await {
            Ok(summary) => {
                result.content = Some(summary);
            }
            Err(error) => {
                tracing::warn!(link = %result.link, %error, "enrichment completion failed");
            }
        }
        result
    }
}
