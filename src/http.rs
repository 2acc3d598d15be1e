//! Shared HTTP client construction with User-Agent rotation.
//!
//! Provider APIs tolerate any client, but the DuckDuckGo scraper and the
//! page fetcher look less like bots with browser-like headers and a
//! rotating User-Agent.

use std::time::Duration;

use rand::seq::SliceRandom;

use crate::error::{OmniError, Result};

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] for provider requests and page fetches.
///
/// Cookie store enabled (DuckDuckGo consent pages), redirects followed,
/// random User-Agent, brotli/gzip decompression.
///
/// # Errors
///
/// Returns [`OmniError::Http`] if the client cannot be constructed.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(timeout)
        .user_agent(random_user_agent())
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| OmniError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}
