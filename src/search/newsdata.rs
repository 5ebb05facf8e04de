// src/search/newsdata.rs
// News-search backend (newsdata.io style JSON API). First in the fallback
// order when its key is present.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;

use super::{get_json_with_proxies, http_client, SearchBackend, RESULT_CAP};
use crate::text::clean_html;
use crate::types::SearchResultItem;

const ENDPOINT: &str = "https://newsdata.io/api/1/news";

pub struct NewsDataBackend {
    api_key: Option<String>,
    client: Option<reqwest::Client>,
}

impl NewsDataBackend {
    pub fn new(api_key: Option<String>) -> Self {
        let client = api_key.as_ref().and_then(|_| http_client().ok());
        Self { api_key, client }
    }
}

#[async_trait]
impl SearchBackend for NewsDataBackend {
    fn name(&self) -> &'static str {
        "newsdata"
    }

    fn configured(&self) -> bool {
        self.api_key.is_some() && self.client.is_some()
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>> {
        let key = self.api_key.as_deref().context("newsdata key missing")?;
        let client = self.client.as_ref().context("newsdata client missing")?;

        // Locale pinned to Singapore; the API already restricts the feed to
        // recent items, so no explicit time-window parameter exists here.
        let size = RESULT_CAP.to_string();
        let url = Url::parse_with_params(
            ENDPOINT,
            [
                ("apikey", key),
                ("q", query),
                ("country", "sg"),
                ("language", "en"),
                ("size", size.as_str()),
            ],
        )
        .context("building newsdata url")?;

        let body = get_json_with_proxies(client, &url).await?;
        Ok(normalize(&body))
    }
}

fn normalize(body: &serde_json::Value) -> Vec<SearchResultItem> {
    let Some(results) = body.get("results").and_then(|r| r.as_array()) else {
        return Vec::new();
    };
    results
        .iter()
        .take(RESULT_CAP)
        .filter_map(|r| {
            let title = r.get("title")?.as_str()?;
            let link = r.get("link").and_then(|l| l.as_str()).unwrap_or_default();
            let snippet = r
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or_default();
            Some(SearchResultItem::new(
                clean_html(title),
                link,
                clean_html(snippet),
            ))
        })
        .collect()
}
