//! Engine and service configuration.
//!
//! [`SearchEngineConfig`] carries per-provider credentials and free-form
//! parameters; [`ServiceConfig`] is the process-level configuration read
//! once from the environment at startup.

use std::collections::HashMap;

use crate::error::{OmniError, Result};

/// Configuration for one provider adapter. Immutable once constructed.
#[derive(Debug, Clone, Default)]
pub struct SearchEngineConfig {
    /// Provider API key. Empty for engines that need none (DuckDuckGo).
    pub api_key: String,
    /// Override of the provider's default endpoint URL. Also the seam
    /// used by mock-server tests.
    pub endpoint: Option<String>,
    /// Free-form provider parameters (`cx` for Google, `region` for
    /// DuckDuckGo, etc.).
    pub params: HashMap<String, String>,
}

impl SearchEngineConfig {
    /// Build a config with the given API key and no extra parameters.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Set the endpoint override.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Add one provider parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Default search-response cache TTL in seconds.
pub const DEFAULT_SEARCH_TTL: u64 = 30;

/// Process-level configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bind host for the HTTP server.
    pub host: String,
    /// Bind port for the HTTP server.
    pub port: u16,
    /// Static bearer token. Empty disables authentication.
    pub api_key: String,
    /// Cache TTL for merged search responses, in seconds.
    pub search_ttl: u64,
    /// Chat-completion model name.
    pub model_name: String,
    /// Completion API key.
    pub openai_api_key: String,
    /// Completion API base URL, including `/v1`.
    pub openai_base_url: String,
    /// Google Custom Search API key.
    pub google_api_key: String,
    /// Google Custom Search engine id (`cx`).
    pub google_cx: String,
    /// Bing Web Search subscription key.
    pub bing_api_key: String,
    /// DuckDuckGo region code (`kl` parameter), e.g. `us-en`.
    pub ddg_region: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8000,
            api_key: String::new(),
            search_ttl: DEFAULT_SEARCH_TTL,
            model_name: "gpt-4o-mini".to_owned(),
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com/v1".to_owned(),
            google_api_key: String::new(),
            google_cx: String::new(),
            bing_api_key: String::new(),
            ddg_region: None,
        }
    }
}

impl ServiceConfig {
    /// Read configuration from the environment, falling back to defaults
    /// for anything unset.
    ///
    /// # Errors
    ///
    /// Returns [`OmniError::Config`] if `PORT` or `SEARCH_TTL` is set but
    /// not parseable.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| OmniError::Config(format!("PORT is not a valid port: {raw}")))?,
            Err(_) => defaults.port,
        };
        let search_ttl = match std::env::var("SEARCH_TTL") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| OmniError::Config(format!("SEARCH_TTL is not a number: {raw}")))?,
            Err(_) => defaults.search_ttl,
        };

        Ok(Self {
            host: env_or("HOST", &defaults.host),
            port,
            api_key: env_or("API_KEY", ""),
            search_ttl,
            model_name: env_or("MODEL_NAME", &defaults.model_name),
            openai_api_key: env_or("OPENAI_API_KEY", ""),
            openai_base_url: env_or("OPENAI_BASE_URL", &defaults.openai_base_url),
            google_api_key: env_or("GOOGLE_API_KEY", ""),
            google_cx: env_or("GOOGLE_CX", ""),
            bing_api_key: env_or("BING_API_KEY", ""),
            ddg_region: std::env::var("DDG_REGION").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Whether bearer-token authentication is enabled.
    pub fn auth_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}
