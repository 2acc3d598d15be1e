//! End-to-end pipeline tests: real provider adapters, fetcher, and
//! completion client wired into the orchestrator, all pointed at a mock
//! HTTP server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use omnisearch::config::SearchEngineConfig;
use omnisearch::engine::SearchOptions;
use omnisearch::engines::{BingSearch, GoogleSearch};
use omnisearch::fetcher::HttpFetcher;
use omnisearch::llm::OpenAiClient;
use omnisearch::orchestrator::OmniSearchService;

fn google_body(server_uri: &str) -> serde_json::Value {
    json!({
        "items": [
            {
                "title": "Rust Programming Language",
                "link": format!("{server_uri}/page/rust-lang"),
                "snippet": "A language empowering everyone."
            },
            {
                "title": "The Rust Book",
                "link": format!("{server_uri}/page/rust-book"),
                "snippet": "An introductory book about Rust."
            }
        ]
    })
}

fn bing_body(server_uri: &str) -> serde_json::Value {
    json!({
        "webPages": {
            "value": [
                {
                    "name": "Rust on crates.io",
                    "url": format!("{server_uri}/page/crates-io"),
                    "snippet": "The Rust community's crate registry."
                }
            ]
        }
    })
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

async fn mount_providers(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("q", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(google_body(&server.uri())))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v7.0/search"))
        .and(header("Ocp-Apim-Subscription-Key", "b-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_body(&server.uri())))
        .mount(server)
        .await;
}

async fn mount_pages(server: &MockServer) {
    for slug in ["rust-lang", "rust-book", "crates-io"] {
        Mock::given(method("GET"))
            .and(path(format!("/page/{slug}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<html><head><title>{slug}</title></head>\
                 <body><main><p>Article text for {slug}.</p></main></body></html>"
            )))
            .mount(server)
            .await;
    }
}

fn service(server: &MockServer) -> OmniSearchService {
    let llm = OpenAiClient::new(format!("{}/v1", server.uri()), "llm-key", "gpt-4o-mini")
        .expect("client");
    let mut svc = OmniSearchService::new(Arc::new(HttpFetcher::new()), Arc::new(llm));

    svc.add_engine(
        "google",
        Box::new(GoogleSearch::new(
            SearchEngineConfig::new("g-key")
                .with_endpoint(format!("{}/customsearch/v1", server.uri()))
                .with_param("cx", "engine-id"),
        )),
    );
    svc.add_engine(
        "bing",
        Box::new(BingSearch::new(
            SearchEngineConfig::new("b-key")
                .with_endpoint(format!("{}/v7.0/search", server.uri())),
        )),
    );
    svc
}

#[tokio::test]
async fn fan_out_merges_providers_with_engine_local_indices() {
    let server = MockServer::start().await;
    mount_providers(&server).await;

    let results = service(&server)
        .search("rust", &SearchOptions::default())
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].source_engine, "Google");
    assert_eq!(results[0].index, Some(0));
    assert_eq!(results[1].index, Some(1));
    assert_eq!(results[2].source_engine, "Bing");
    assert_eq!(results[2].index, Some(0));
    assert!(results.iter().all(|r| r.content.is_none()));
}

#[tokio::test]
async fn enrichment_fetches_pages_and_summarises() {
    let server = MockServer::start().await;
    mount_providers(&server).await;
    mount_pages(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("curated page summary")),
        )
        .expect(3)
        .mount(&server)
        .await;

    let options = SearchOptions {
        fetch_content: true,
        ..Default::default()
    };
    let results = service(&server).search("rust", &options).await;

    assert_eq!(results.len(), 3);
    for r in &results {
        assert_eq!(r.content.as_deref(), Some("curated page summary"));
    }
    // Enrichment does not disturb ordering or numbering.
    assert_eq!(results[0].index, Some(0));
    assert_eq!(results[2].index, Some(0));
}

#[tokio::test]
async fn provider_outage_is_isolated_from_the_other_provider() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v7.0/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_body(&server.uri())))
        .mount(&server)
        .await;

    let results = service(&server)
        .search("rust", &SearchOptions::default())
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source_engine, "Bing");
    assert_eq!(results[0].index, Some(0));
}

#[tokio::test]
async fn enrichment_survives_completion_outage() {
    let server = MockServer::start().await;
    mount_providers(&server).await;
    mount_pages(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let options = SearchOptions {
        fetch_content: true,
        ..Default::default()
    };
    let results = service(&server).search("rust", &options).await;

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.content.is_none()));
}
