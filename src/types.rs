//! Core types for search results and fetched page content.

use serde::{Deserialize, Serialize};

/// A single search result returned from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result page.
    pub title: String,
    /// The URL of the result.
    pub link: String,
    /// A text snippet summarising the page.
    pub snippet: String,
    /// LLM-extracted page content. `None` unless enrichment was
    /// requested and both the fetch and the completion succeeded.
    pub content: Option<String>,
    /// Which provider returned this result (e.g. `"Google"`).
    pub source_engine: String,
    /// Position within the owning engine's result set. Assigned by the
    /// orchestrator after that engine's results arrive: 0-based and
    /// engine-local, not unique across engines.
    pub index: Option<usize>,
}

impl SearchResult {
    /// Build a result with `content` and `index` unset.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
        source_engine: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
            content: None,
            source_engine: source_engine.into(),
            index: None,
        }
    }
}

/// The outcome of fetching one web page.
///
/// Fetch failures are carried in-band: a non-empty [`error`](Self::error)
/// means the fetch failed and the other fields are unreliable. Callers
/// must check it before using `clean_text`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchedContent {
    /// The URL that was requested.
    pub url: String,
    /// Raw response body as received.
    pub raw_content: String,
    /// Readable text with HTML boilerplate stripped.
    pub clean_text: String,
    /// HTTP status code, or 0 if the request never completed.
    pub status_code: u16,
    /// Non-empty on failure.
    pub error: String,
}

impl FetchedContent {
    /// Build a failed fetch carrying only the URL and error message.
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: error.into(),
            ..Self::default()
        }
    }

    /// Whether the fetch failed.
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}
