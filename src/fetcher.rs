//! Page fetching for result enrichment.
//!
//! [`ContentFetcher`] is polymorphic over fetch strategy; [`HttpFetcher`]
//! is the plain GET + text-extraction implementation. Failures are
//! carried in-band on [`FetchedContent::error`] rather than as `Err`, so
//! enrichment can keep the owning result either way.

use std::time::Duration;

use async_trait::async_trait;

use crate::content;
use crate::http;
use crate::types::FetchedContent;

/// Retrieves a URL and extracts readable text from it.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch one page. Never returns `Err`; check
    /// [`FetchedContent::is_error`] instead.
    async fn fetch(&self, url: &str) -> FetchedContent;
}

/// Plain HTTP GET fetcher with boilerplate-stripping text extraction.
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher with the default timeout.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(http::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build a fetcher with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn fetch_inner(&self, url: &str) -> Result<FetchedContent, String> {
        let client = http::build_client(self.timeout).map_err(|e| e.to_string())?;

        let response = client.get(url).send().await.map_err(|e| e.to_string())?;
        let status_code = response.status().as_u16();
        let raw_content = response.text().await.map_err(|e| e.to_string())?;
        let clean_text = content::extract_text(&raw_content);

        Ok(FetchedContent {
            url: url.to_owned(),
            raw_content,
            clean_text,
            status_code,
            error: String::new(),
        })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchedContent {
        tracing::trace!(url, "fetching page");
        match self.fetch_inner(url).await {
            Ok(fetched) => {
                tracing::debug!(
                    url,
                    status = fetched.status_code,
                    chars = fetched.clean_text.len(),
                    "page fetched"
                );
                fetched
            }
            Err(error) => {
                tracing::warn!(url, %error, "page fetch failed");
                FetchedContent::failed(url, error)
            }
        }
    }
}
