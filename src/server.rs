//! HTTP layer: one authenticated search route plus liveness endpoints.
//!
//! ## Endpoints
//!
//! - `POST /v1/search` — cache-checked meta-search (bearer auth)
//! - `GET /` — liveness, unauthenticated
//! - `HEAD /v1/health` — liveness, unauthenticated
//!
//! Every response carries an `X-Process-Time` header with the elapsed
//! handler time in seconds.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, head, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::KvCache;
use crate::config::{SearchEngineConfig, ServiceConfig};
use crate::engine::SearchOptions;
use crate::engines::{BingSearch, DuckDuckGoSearch, GoogleSearch};
use crate::error::Result;
use crate::fetcher::HttpFetcher;
use crate::llm::OpenAiClient;
use crate::orchestrator::OmniSearchService;
use crate::types::SearchResult;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /v1/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The search query.
    pub query: String,
    /// Per-provider result cap.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Whether to enrich results with fetched-and-summarised page content.
    #[serde(default)]
    pub fetch_content: bool,
    /// Engine names to fan out to. Unknown names are skipped.
    #[serde(default = "default_engines")]
    pub search_engines: Vec<String>,
}

fn default_max_results() -> usize {
    10
}

fn default_engines() -> Vec<String> {
    vec!["duckduckgo".to_owned()]
}

/// Fixed success envelope returned by the search route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Merged results from all requested engines.
    pub data: Vec<SearchResult>,
    /// Always 0.
    pub code: i32,
    /// Always `"success"`.
    pub message: String,
}

impl SearchResponse {
    fn success(data: Vec<SearchResult>) -> Self {
        Self {
            data,
            code: 0,
            message: "success".to_owned(),
        }
    }
}

/// Cache key for one request signature.
///
/// Identical `(trimmed query, max_results, fetch_content, engine list)`
/// tuples map to the same key.
pub fn cache_key(request: &SearchRequest) -> String {
    let signature = format!(
        "{}{}{}{:?}",
        request.query.trim(),
        request.max_results,
        request.fetch_content,
        request.search_engines
    );
    let digest = Sha256::digest(signature.as_bytes());
    format!("omnisearch.search.{digest:x}")
}

// ---------------------------------------------------------------------------
// Search backend seam
// ---------------------------------------------------------------------------

/// Executes the fan-out for one request. The production implementation
/// assembles an [`OmniSearchService`] from [`ServiceConfig`]; tests stub
/// this to keep providers out of the loop.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run the fan-out. Provider failures are isolated inside, so this
    /// never fails; it may return an empty list.
    async fn search(&self, request: &SearchRequest) -> Vec<SearchResult>;
}

/// Production backend: one [`OmniSearchService`] per request, engines
/// chosen from the request's `search_engines` list.
pub struct OmniBackend {
    config: ServiceConfig,
    fetcher: Arc<HttpFetcher>,
    llm: Arc<OpenAiClient>,
}

impl OmniBackend {
    /// Build the backend and its shared fetcher/completion clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion HTTP client cannot be built.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let llm = OpenAiClient::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.model_name.clone(),
        )?;
        Ok(Self {
            config,
            fetcher: Arc::new(HttpFetcher::new()),
            llm: Arc::new(llm),
        })
    }

    fn build_service(&self, engine_names: &[String]) -> OmniSearchService {
        let mut service = OmniSearchService::new(self.fetcher.clone(), self.llm.clone());

        for name in engine_names {
            match name.as_str() {
                "google" => {
                    let config = SearchEngineConfig::new(self.config.google_api_key.clone())
                        .with_param("cx", self.config.google_cx.clone());
                    service.add_engine("google", Box::new(GoogleSearch::new(config)));
                }
                "bing" => {
                    let config = SearchEngineConfig::new(self.config.bing_api_key.clone());
                    service.add_engine("bing", Box::new(BingSearch::new(config)));
                }
                "duckduckgo" => {
                    let mut config = SearchEngineConfig::default();
                    if let Some(region) = &self.config.ddg_region {
                        config = config.with_param("region", region.clone());
                    }
                    service.add_engine("duckduckgo", Box::new(DuckDuckGoSearch::new(config)));
                }
                other => {
                    tracing::warn!(engine = other, "unknown engine requested, skipping");
                }
            }
        }

        service
    }
}

#[async_trait]
impl SearchBackend for OmniBackend {
    async fn search(&self, request: &SearchRequest) -> Vec<SearchResult> {
        let service = self.build_service(&request.search_engines);
        let options = SearchOptions {
            max_results: Some(request.max_results),
            fetch_content: request.fetch_content,
        };
        service.search(request.query.trim(), &options).await
    }
}

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServiceConfig>,
    cache: Arc<dyn KvCache>,
    backend: Arc<dyn SearchBackend>,
}

impl AppState {
    /// Assemble the handler state.
    pub fn new(
        config: ServiceConfig,
        cache: Arc<dyn KvCache>,
        backend: Arc<dyn SearchBackend>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            cache,
            backend,
        }
    }
}

/// Build the service router with auth and timing middleware applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/v1/health", head(handle_health))
        .route("/v1/search", post(handle_search))
        .layer(middleware::from_fn_with_state(state.clone(), auth))
        .layer(middleware::from_fn(process_time))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// OmniServer
// ---------------------------------------------------------------------------

/// The HTTP server, running in a background tokio task.
pub struct OmniServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl OmniServer {
    /// Bind `{host}:{port}` (port 0 auto-assigns) and begin serving.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::OmniError::Http`] if the listener cannot
    /// bind.
    pub async fn start(state: AppState, host: &str, port: u16) -> Result<Self> {
        let app = router(state);

        let bind_addr = format!("{host}:{port}");
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| crate::error::OmniError::Http(format!("bind {bind_addr} failed: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| crate::error::OmniError::Http(format!("failed to get local addr: {e}")))?;

        info!("omnisearch listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// The address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for OmniServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

/// Routes exempt from bearer-token auth.
const AUTH_WHITELIST: &[&str] = &["/", "/v1/health"];

/// Bearer-token check. Passes everything when no API key is configured.
async fn auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if AUTH_WHITELIST.contains(&path) || !state.config.auth_enabled() {
        return next.run(request).await;
    }

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| token == state.config.api_key);

    if authorized {
        next.run(request).await
    } else {
        (StatusCode::FORBIDDEN, "Forbidden").into_response()
    }
}

/// Stamp handler wall time (seconds) on every response.
async fn process_time(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let mut response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();
    if let Ok(value) = HeaderValue::from_str(&elapsed.to_string()) {
        response.headers_mut().insert("x-process-time", value);
    }
    response
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// `GET /` — liveness.
async fn handle_index() -> &'static str {
    "Hello World\n"
}

/// `HEAD /v1/health` — liveness.
async fn handle_health() -> StatusCode {
    StatusCode::OK
}

/// `POST /v1/search` — cache-checked meta-search.
async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let key = cache_key(&request);

    if let Some(cached) = state.cache.get(&key).await {
        match serde_json::from_str::<Vec<SearchResult>>(&cached) {
            Ok(data) => {
                info!(query = %request.query, "cache hit");
                return Json(SearchResponse::success(data));
            }
            Err(error) => {
                // A corrupt entry falls through to a fresh fan-out.
                tracing::warn!(%key, %error, "discarding undecodable cache entry");
            }
        }
    }

    info!(query = %request.query, engines = ?request.search_engines, "user query");
    let begin = Instant::now();
    let results = state.backend.search(&request).await;
    info!(
        elapsed_secs = begin.elapsed().as_secs_f64(),
        count = results.len(),
        "search complete"
    );

    if !results.is_empty() {
        match serde_json::to_string(&results) {
            Ok(payload) => {
                state
                    .cache
                    .setex(&key, state.config.search_ttl, &payload)
                    .await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to serialise results for cache");
            }
        }
    }

    Json(SearchResponse::success(results))
}
