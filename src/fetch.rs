// src/fetch.rs
// Content Fetcher stage: full article text via an ordered list of
// read-through proxy endpoints. Batches are sequential; fetches inside a
// batch run in parallel and the merged output preserves item order.

use async_trait::async_trait;
use metrics::counter;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::text::clean_html;
use crate::types::{ArticleText, SearchResultItem};

/// A body at or below this length counts as "not fetched".
pub const MIN_ARTICLE_CHARS: usize = 200;
/// Concurrent fetches per batch.
pub const FETCH_BATCH: usize = 4;
/// Only the first N search results are fetched at all.
pub const MAX_FETCH_ITEMS: usize = 20;
const FETCH_TIMEOUT_SECS: u64 = 10;

/// Read-through endpoints tried in order; first usable body wins.
enum ReaderEndpoint {
    /// Target URL is appended to the prefix verbatim (r.jina.ai style).
    Prefix(&'static str),
    /// Target URL goes into a `url` query parameter.
    Param(&'static str),
}

const READERS: &[ReaderEndpoint] = &[
    ReaderEndpoint::Prefix("https://r.jina.ai/"),
    ReaderEndpoint::Param("https://api.allorigins.win/raw"),
];

impl ReaderEndpoint {
    fn url_for(&self, target: &str) -> Option<Url> {
        match self {
            ReaderEndpoint::Prefix(base) => Url::parse(&format!("{base}{target}")).ok(),
            ReaderEndpoint::Param(base) => Url::parse_with_params(base, [("url", target)]).ok(),
        }
    }
}

#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch_text(&self, item: &SearchResultItem) -> ArticleText;
}

/// Production fetcher going through the reader proxy chain.
pub struct ProxyReaderFetcher {
    client: Option<reqwest::Client>,
}

impl ProxyReaderFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent("shopwatch/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .ok();
        Self { client }
    }
}

impl Default for ProxyReaderFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleFetcher for ProxyReaderFetcher {
    async fn fetch_text(&self, item: &SearchResultItem) -> ArticleText {
        let Some(client) = self.client.as_ref() else {
            return ArticleText::unfetched(item.clone());
        };
        for reader in READERS {
            let Some(url) = reader.url_for(&item.link) else {
                continue;
            };
            let body = match client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => resp.text().await.ok(),
                Ok(resp) => {
                    tracing::warn!(status = %resp.status(), link = %item.link, "reader returned non-success");
                    None
                }
                Err(e) => {
                    tracing::warn!(error = ?e, link = %item.link, "reader transport failed");
                    None
                }
            };
            if let Some(text) = body.as_deref().and_then(usable_body) {
                return ArticleText {
                    item: item.clone(),
                    body: text,
                    fetched: true,
                };
            }
        }
        counter!("news_fetch_failures_total").increment(1);
        ArticleText::unfetched(item.clone())
    }
}

/// Clean the raw body and apply the usable-content threshold. Short bodies
/// are fetch failures, not articles.
fn usable_body(raw: &str) -> Option<String> {
    let text = clean_html(raw);
    if text.chars().count() > MIN_ARTICLE_CHARS {
        Some(text)
    } else {
        None
    }
}

/// Fetch text for the first `MAX_FETCH_ITEMS` items. Batches of
/// `FETCH_BATCH` run strictly in sequence; inside a batch each fetch writes
/// into its own indexed slot so the merge preserves the input order.
pub async fn fetch_batch(
    fetcher: Arc<dyn ArticleFetcher>,
    items: &[SearchResultItem],
) -> Vec<ArticleText> {
    let capped = &items[..items.len().min(MAX_FETCH_ITEMS)];
    let mut out: Vec<Option<ArticleText>> = vec![None; capped.len()];

    for (batch_idx, batch) in capped.chunks(FETCH_BATCH).enumerate() {
        let base = batch_idx * FETCH_BATCH;
        let mut set = JoinSet::new();
        for (offset, item) in batch.iter().cloned().enumerate() {
            let fetcher = Arc::clone(&fetcher);
            set.spawn(async move { (base + offset, fetcher.fetch_text(&item).await) });
        }
        while let Some(res) = set.join_next().await {
            match res {
                Ok((idx, article)) => out[idx] = Some(article),
                Err(e) => tracing::warn!(error = ?e, "fetch task panicked"),
            }
        }
    }

    // Slots left empty (task panic) degrade to "not fetched".
    out.into_iter()
        .enumerate()
        .map(|(i, slot)| slot.unwrap_or_else(|| ArticleText::unfetched(capped[i].clone())))
        .collect()
}
