//! DuckDuckGo adapter — no official API, so this scrapes the HTML-only
//! results page at `https://html.duckduckgo.com/html/`, which requires no
//! JavaScript and tolerates automated requests.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::config::SearchEngineConfig;
use crate::engine::{SearchEngine, SearchOptions};
use crate::error::{OmniError, Result};
use crate::http;
use crate::types::SearchResult;

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

const ENGINE_NAME: &str = "DuckDuckGo";

/// DuckDuckGo HTML scraper adapter.
///
/// Recognised [`SearchEngineConfig::params`]: `region` (`kl` form field,
/// e.g. `us-en`), `timelimit` (`df`: `d`/`w`/`m`/`y`, default `y`), and
/// `safesearch` (`off`/`moderate`/`strict`, default `off`).
pub struct DuckDuckGoSearch {
    config: SearchEngineConfig,
}

impl DuckDuckGoSearch {
    /// Build the adapter from its provider config.
    pub fn new(config: SearchEngineConfig) -> Self {
        Self { config }
    }

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`;
    /// the `uddg` query parameter holds the destination.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }

    fn build_form(&self, query: &str) -> Vec<(&'static str, String)> {
        let mut form = vec![("q", query.to_owned())];

        if let Some(region) = self.config.params.get("region") {
            form.push(("kl", region.clone()));
        }
        let timelimit = self
            .config
            .params
            .get("timelimit")
            .map(String::as_str)
            .unwrap_or("y");
        form.push(("df", timelimit.to_owned()));

        // Safe search is off unless asked for, matching the upstream defaults.
        let safesearch = self
            .config
            .params
            .get("safesearch")
            .map(String::as_str)
            .unwrap_or("off");
        let kp = match safesearch {
            "off" => "-2",
            "moderate" => "-1",
            _ => "1",
        };
        form.push(("kp", kp.to_owned()));

        form
    }
}

#[async_trait]
impl SearchEngine for DuckDuckGoSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        tracing::trace!(query, "DuckDuckGo search");

        let client = http::build_client(Duration::from_secs(http::DEFAULT_TIMEOUT_SECS))?;

        let endpoint = self.config.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let response = client
            .post(endpoint)
            .form(&self.build_form(query))
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| OmniError::Http(format!("DuckDuckGo request failed: {e}")))?
            .error_for_status()
            .map_err(|e| OmniError::Http(format!("DuckDuckGo HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| OmniError::Http(format!("DuckDuckGo response read failed: {e}")))?;

        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

        parse_duckduckgo_html(&html, options.max_results.unwrap_or(usize::MAX))
    }

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }
}

/// Parse DuckDuckGo HTML into search results.
///
/// Extracted as a separate function for testability with mock HTML.
pub(crate) fn parse_duckduckgo_html(html: &str, max_results: usize) -> Result<Vec<SearchResult>> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| OmniError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| OmniError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| OmniError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let title_el = match element.select(&title_sel).next() {
            Some(el) => el,
            None => continue,
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let href = match title_el.value().attr("href") {
            Some(h) => h,
            None => continue,
        };

        let link = match DuckDuckGoSearch::extract_url(href) {
            Some(u) => u,
            None => continue,
        };

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        results.push(SearchResult::new(title, link, snippet, ENGINE_NAME));

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}
