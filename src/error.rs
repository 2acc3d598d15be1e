//! Error types for the omnisearch crate.
//!
//! All errors carry stable string messages suitable for logging and
//! display. API keys never appear in error messages.

/// Errors that can occur during search, enrichment, or serving.
#[derive(Debug, thiserror::Error)]
pub enum OmniError {
    /// An HTTP request to a provider, page, or model API failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a provider response (HTML or JSON).
    #[error("parse error: {0}")]
    Parse(String),

    /// The completion API returned an unusable response.
    #[error("completion error: {0}")]
    Completion(String),

    /// A named engine was requested but never registered.
    #[error("engine {0} not configured")]
    EngineNotConfigured(String),

    /// Invalid service or engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Cache serialisation or storage failure.
    #[error("cache error: {0}")]
    Cache(String),
}

/// Convenience type alias for omnisearch results.
pub type Result<T> = std::result::Result<T, OmniError>;
