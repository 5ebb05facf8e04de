// src/search/google_cse.rs
// General web-search backend (Google Custom Search JSON API). Second in the
// fallback order; needs both the API key and the engine id.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;

use super::{get_json_with_proxies, http_client, SearchBackend, RESULT_CAP};
use crate::text::clean_html;
use crate::types::SearchResultItem;

const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

pub struct GoogleCseBackend {
    api_key: Option<String>,
    engine_id: Option<String>,
    client: Option<reqwest::Client>,
}

impl GoogleCseBackend {
    pub fn new(api_key: Option<String>, engine_id: Option<String>) -> Self {
        let client = api_key
            .as_ref()
            .and(engine_id.as_ref())
            .and_then(|_| http_client().ok());
        Self {
            api_key,
            engine_id,
            client,
        }
    }
}

#[async_trait]
impl SearchBackend for GoogleCseBackend {
    fn name(&self) -> &'static str {
        "google-cse"
    }

    fn configured(&self) -> bool {
        self.api_key.is_some() && self.engine_id.is_some() && self.client.is_some()
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>> {
        let key = self.api_key.as_deref().context("google key missing")?;
        let cx = self.engine_id.as_deref().context("google cx missing")?;
        let client = self.client.as_ref().context("google client missing")?;

        // gl pins the locale; dateRestrict keeps hits inside the 7-day window.
        let num = RESULT_CAP.to_string();
        let url = Url::parse_with_params(
            ENDPOINT,
            [
                ("q", query),
                ("cx", cx),
                ("key", key),
                ("num", num.as_str()),
                ("gl", "sg"),
                ("dateRestrict", "d7"),
            ],
        )
        .context("building google cse url")?;

        let body = get_json_with_proxies(client, &url).await?;
        Ok(normalize(&body))
    }
}

fn normalize(body: &serde_json::Value) -> Vec<SearchResultItem> {
    let Some(items) = body.get("items").and_then(|i| i.as_array()) else {
        return Vec::new();
    };
    items
        .iter()
        .take(RESULT_CAP)
        .filter_map(|it| {
            let title = it.get("title")?.as_str()?;
            let link = it.get("link").and_then(|l| l.as_str()).unwrap_or_default();
            let snippet = it
                .get("snippet")
                .and_then(|s| s.as_str())
                .unwrap_or_default();
            Some(SearchResultItem::new(
                clean_html(title),
                link,
                clean_html(snippet),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_items_with_markup_in_snippets() {
        let body = json!({
            "items": [{
                "title": "New cafe opens",
                "link": "https://www.straitstimes.com/x",
                "snippet": "A <b>new</b> cafe&nbsp;opens"
            }]
        });
        let out = normalize(&body);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].snippet, "A new cafe opens");
        assert_eq!(out[0].source_host, "www.straitstimes.com");
    }

    #[test]
    fn empty_payload_yields_empty() {
        assert!(normalize(&json!({})).is_empty());
    }
}
