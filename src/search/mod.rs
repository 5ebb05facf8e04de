// src/search/mod.rs
// Source Search stage: ordered backend fallback, transport-level proxy
// retry, and normalization into `SearchResultItem`. This stage never errors
// to the caller; exhausting every backend yields an empty sequence.

pub mod google_cse;
pub mod newsdata;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use reqwest::Url;
use std::collections::HashSet;
use std::time::Duration;

use crate::config::Credentials;
use crate::types::SearchResultItem;

/// Per-call budget for a search request, direct or proxied.
pub const SEARCH_TIMEOUT_SECS: u64 = 12;
/// Result count cap requested from each backend.
pub const RESULT_CAP: usize = 10;

/// Pass-through retrieval proxies tried, in order, when a direct call fails.
/// Content-neutral: the logical request is identical, only the transport
/// changes.
const PASSTHROUGH_PROXIES: &[&str] = &["https://api.allorigins.win/raw", "https://corsproxy.io/"];

#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &'static str;
    /// Whether the credential this backend depends on is present.
    fn configured(&self) -> bool;
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>>;
}

/// Fixed query: site filters plus the opening/closure keyword OR-list.
pub fn build_query() -> String {
    "site:todayonline.com OR site:straitstimes.com \
     opening OR closure OR closes OR \"shutting down\" Singapore"
        .to_string()
}

/// Shared HTTP client shape for search backends and proxies.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("shopwatch/0.1")
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
        .build()
        .context("building search http client")
}

pub fn default_backends(creds: &Credentials) -> Vec<Box<dyn SearchBackend>> {
    // Priority order: news-search first, general web-search second.
    vec![
        Box::new(newsdata::NewsDataBackend::new(creds.news_api_key.clone())),
        Box::new(google_cse::GoogleCseBackend::new(
            creds.google_api_key.clone(),
            creds.google_engine_id.clone(),
        )),
    ]
}

pub fn any_configured(backends: &[Box<dyn SearchBackend>]) -> bool {
    backends.iter().any(|b| b.configured())
}

/// Try backends in priority order; the first successful response is used
/// exclusively for the run. Every failure is recovered locally; exhausting
/// the list yields an empty sequence.
pub async fn search_with_fallback(
    backends: &[Box<dyn SearchBackend>],
    query: &str,
) -> Vec<SearchResultItem> {
    for backend in backends {
        if !backend.configured() {
            continue;
        }
        match backend.search(query).await {
            Ok(items) => {
                tracing::info!(backend = backend.name(), hits = items.len(), "search succeeded");
                return dedup_by_link(items);
            }
            Err(e) => {
                tracing::warn!(error = ?e, backend = backend.name(), "search backend failed");
                counter!("news_search_backend_errors_total").increment(1);
            }
        }
    }
    Vec::new()
}

/// Keep the first occurrence of each link; also drops items with no link at
/// all, since nothing downstream can cite them.
fn dedup_by_link(items: Vec<SearchResultItem>) -> Vec<SearchResultItem> {
    let mut seen: HashSet<String> = HashSet::new();
    items
        .into_iter()
        .filter(|it| !it.link.is_empty() && seen.insert(it.link.clone()))
        .collect()
}

/// GET a URL expecting a JSON body, retrying through the pass-through proxy
/// chain when the direct call fails. First parseable JSON body wins.
pub(crate) async fn get_json_with_proxies(
    client: &reqwest::Client,
    url: &Url,
) -> Result<serde_json::Value> {
    match get_json(client, url.clone()).await {
        Ok(v) => return Ok(v),
        Err(e) => {
            tracing::warn!(error = ?e, url = %url, "direct call failed, trying proxies");
            counter!("news_search_proxy_retries_total").increment(1);
        }
    }
    for proxy in PASSTHROUGH_PROXIES {
        let Ok(wrapped) = Url::parse_with_params(proxy, [("url", url.as_str())]) else {
            continue;
        };
        match get_json(client, wrapped).await {
            Ok(v) => return Ok(v),
            Err(e) => {
                tracing::warn!(error = ?e, proxy, "proxy transport failed");
            }
        }
    }
    bail!("all transports failed for {url}")
}

async fn get_json(client: &reqwest::Client, url: Url) -> Result<serde_json::Value> {
    let resp = client.get(url).send().await.context("sending request")?;
    if !resp.status().is_success() {
        bail!("non-success status {}", resp.status());
    }
    resp.json::<serde_json::Value>().await.context("parsing json body")
}
