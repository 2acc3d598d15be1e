//! Google Custom Search JSON API adapter.
//!
//! Requires an API key and a custom search engine id (`cx` in
//! [`SearchEngineConfig::params`]).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SearchEngineConfig;
use crate::engine::{SearchEngine, SearchOptions};
use crate::error::{OmniError, Result};
use crate::http;
use crate::types::SearchResult;

const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

const ENGINE_NAME: &str = "Google";

/// Google Custom Search adapter.
pub struct GoogleSearch {
    config: SearchEngineConfig,
}

impl GoogleSearch {
    /// Build the adapter from its provider config.
    pub fn new(config: SearchEngineConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

#[async_trait]
impl SearchEngine for GoogleSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        tracing::trace!(query, "Google search");

        let client = http::build_client(Duration::from_secs(http::DEFAULT_TIMEOUT_SECS))?;

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_owned()),
            ("key", self.config.api_key.clone()),
        ];
        for (k, v) in &self.config.params {
            params.push((k.as_str(), v.clone()));
        }
        if let Some(max_results) = options.max_results {
            params.push(("num", max_results.to_string()));
        }

        let endpoint = self.config.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let response = client
            .get(endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| OmniError::Http(format!("Google request failed: {e}")))?
            .error_for_status()
            .map_err(|e| OmniError::Http(format!("Google HTTP error: {e}")))?;

        let parsed: GoogleResponse = response
            .json()
            .await
            .map_err(|e| OmniError::Parse(format!("Google response decode failed: {e}")))?;

        let results: Vec<SearchResult> = parsed
            .items
            .into_iter()
            .map(|item| SearchResult::new(item.title, item.link, item.snippet, ENGINE_NAME))
            .collect();

        tracing::debug!(count = results.len(), "Google results parsed");
        Ok(results)
    }

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }
}
