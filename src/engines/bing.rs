//! Bing Web Search API (v7) adapter.
//!
//! Authenticates with the `Ocp-Apim-Subscription-Key` header.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SearchEngineConfig;
use crate::engine::{SearchEngine, SearchOptions};
use crate::error::{OmniError, Result};
use crate::http;
use crate::types::SearchResult;

const DEFAULT_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/search";

const ENGINE_NAME: &str = "Bing";

/// Bing Web Search adapter.
pub struct BingSearch {
    config: SearchEngineConfig,
}

impl BingSearch {
    /// Build the adapter from its provider config.
    pub fn new(config: SearchEngineConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Deserialize)]
struct BingResponse {
    #[serde(rename = "webPages", default)]
    web_pages: Option<WebPages>,
}

#[derive(Debug, Deserialize)]
struct WebPages {
    #[serde(default)]
    value: Vec<BingPage>,
}

#[derive(Debug, Deserialize)]
struct BingPage {
    name: String,
    url: String,
    #[serde(default)]
    snippet: String,
}

#[async_trait]
impl SearchEngine for BingSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        tracing::trace!(query, "Bing search");

        let client = http::build_client(Duration::from_secs(http::DEFAULT_TIMEOUT_SECS))?;

        let mut params: Vec<(&str, String)> = vec![("q", query.to_owned())];
        for (k, v) in &self.config.params {
            params.push((k.as_str(), v.clone()));
        }
        if let Some(max_results) = options.max_results {
            params.push(("count", max_results.to_string()));
        }

        let endpoint = self.config.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let response = client
            .get(endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.config.api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| OmniError::Http(format!("Bing request failed: {e}")))?
            .error_for_status()
            .map_err(|e| OmniError::Http(format!("Bing HTTP error: {e}")))?;

        let parsed: BingResponse = response
            .json()
            .await
            .map_err(|e| OmniError::Parse(format!("Bing response decode failed: {e}")))?;

        let results: Vec<SearchResult> = parsed
            .web_pages
            .map(|wp| wp.value)
            .unwrap_or_default()
            .into_iter()
            .map(|page| SearchResult::new(page.name, page.url, page.snippet, ENGINE_NAME))
            .collect();

        tracing::debug!(count = results.len(), "Bing results parsed");
        Ok(results)
    }

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pages_json() -> serde_json::Value {
        json!({
            "_type": "SearchResponse",
            "webPages": {
                "value": [
                    {
                        "name": "Rust Programming Language",
                        "url": "https://www.rust-lang.org/",
                        "snippet": "A language empowering everyone."
                    },
                    {
                        "name": "Rust - Wikipedia",
                        "url": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
                        "snippet": "Rust is a general-purpose programming language."
                    }
                ]
            }
        })
    }

    #[tokio::test]
    async fn parses_web_pages_into_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("Ocp-Apim-Subscription-Key", "b-key"))
            .and(query_param("q", "rust"))
            .and(query_param("count", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pages_json()))
            .expect(1)
            .mount(&server)
            .await;

        let engine = BingSearch::new(SearchEngineConfig::new("b-key").with_endpoint(server.uri()));
        let results = engine
            .search("rust", &SearchOptions::with_max_results(3))
            .await
            .expect("should succeed");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[1].link, "https://en.wikipedia.org/wiki/Rust_(programming_language)");
        assert_eq!(results[0].source_engine, "Bing");
    }

    #[tokio::test]
    async fn missing_web_pages_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_type": "SearchResponse"})))
            .mount(&server)
            .await;

        let engine = BingSearch::new(SearchEngineConfig::new("k").with_endpoint(server.uri()));
        let results = engine
            .search("rust", &SearchOptions::default())
            .await
            .expect("should succeed");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn unauthorized_propagates_as_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let engine = BingSearch::new(SearchEngineConfig::new("bad").with_endpoint(server.uri()));
        let err = engine
            .search("rust", &SearchOptions::default())
            .await
            .expect_err("should fail");
        assert!(matches!(err, OmniError::Http(_)));
    }

    #[test]
    fn engine_name() {
        let engine = BingSearch::new(SearchEngineConfig::default());
        assert_eq!(engine.name(), "Bing");
    }
}
