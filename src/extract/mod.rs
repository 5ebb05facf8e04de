// src/extract/mod.rs
// Event Extractor stage: two interchangeable strategies. The model strategy
// needs a credential and is skipped entirely without one; every model
// failure falls back deterministically to the keyword strategy for the same
// input and is reported as a non-fatal status.

pub mod keyword;
pub mod model;

use metrics::counter;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::config::Credentials;
use crate::types::{ArticleText, CandidateEvent, SearchResultItem};
use model::{ModelClient, OpenAiClient};

/// Per-article model requests run in parallel batches of this size.
const EXTRACT_BATCH: usize = 4;

#[derive(Clone)]
pub enum Strategy {
    Model(Arc<dyn ModelClient>),
    Keyword,
}

impl Strategy {
    /// Model iff a credential is configured; otherwise keyword. The same
    /// selection applies to both extraction passes.
    pub fn from_credentials(creds: &Credentials) -> Self {
        match creds.openai_api_key.as_deref() {
            Some(key) => match OpenAiClient::new(key) {
                Ok(client) => Strategy::Model(Arc::new(client)),
                Err(e) => {
                    tracing::warn!(error = ?e, "model client unavailable, using keyword strategy");
                    Strategy::Keyword
                }
            },
            None => Strategy::Keyword,
        }
    }
}

#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    pub events: Vec<CandidateEvent>,
    /// True when the model strategy failed at least once and keyword
    /// extraction stood in for the same input.
    pub fell_back: bool,
}

/// First pass: each item classified from its best available text (fetched
/// body, else snippet). Per-article model requests run concurrently but the
/// merged result preserves the original item order.
pub async fn extract_articles(strategy: &Strategy, articles: &[ArticleText]) -> ExtractionOutcome {
    match strategy {
        Strategy::Keyword => ExtractionOutcome {
            events: articles.iter().filter_map(keyword::extract_from_article).collect(),
            fell_back: false,
        },
        Strategy::Model(client) => extract_articles_with_model(client, articles).await,
    }
}

/// Second pass: snippet-only. The model strategy sends the whole batch in a
/// single request.
pub async fn extract_snippets(strategy: &Strategy, items: &[SearchResultItem]) -> ExtractionOutcome {
    match strategy {
        Strategy::Keyword => ExtractionOutcome {
            events: items.iter().filter_map(keyword::extract_from_snippet).collect(),
            fell_back: false,
        },
        Strategy::Model(client) => match client.extract_events(&snippet_prompt(items)).await {
            Ok(events) => ExtractionOutcome {
                events,
                fell_back: false,
            },
            Err(e) => {
                tracing::warn!(error = ?e, "model snippet extraction failed, falling back");
                counter!("news_extract_fallback_total").increment(1);
                ExtractionOutcome {
                    events: items.iter().filter_map(keyword::extract_from_snippet).collect(),
                    fell_back: true,
                }
            }
        },
    }
}

async fn extract_articles_with_model(
    client: &Arc<dyn ModelClient>,
    articles: &[ArticleText],
) -> ExtractionOutcome {
    let mut slots: Vec<Option<Vec<CandidateEvent>>> = vec![None; articles.len()];
    let mut fell_back = false;

    for (batch_idx, batch) in articles.chunks(EXTRACT_BATCH).enumerate() {
        let base = batch_idx * EXTRACT_BATCH;
        let mut set = JoinSet::new();
        for (offset, article) in batch.iter().cloned().enumerate() {
            let client = Arc::clone(client);
            set.spawn(async move {
                let res = client.extract_events(&article_prompt(&article)).await;
                (base + offset, article, res)
            });
        }
        while let Some(joined) = set.join_next().await {
            let Ok((idx, article, res)) = joined else {
                continue;
            };
            match res {
                Ok(events) => slots[idx] = Some(events),
                Err(e) => {
                    tracing::warn!(error = ?e, link = %article.item.link, "model extraction failed, falling back");
                    counter!("news_extract_fallback_total").increment(1);
                    fell_back = true;
                    slots[idx] = Some(keyword::extract_from_article(&article).into_iter().collect());
                }
            }
        }
    }

    ExtractionOutcome {
        events: slots.into_iter().flatten().flatten().collect(),
        fell_back,
    }
}

/// One request carrying the serialized snippet batch.
fn snippet_prompt(items: &[SearchResultItem]) -> String {
    let mut prompt = String::from(
        "From the news snippets below, list only headlines that clearly \
         indicate a business opening or closure (Singapore focus). If \
         unsure, skip. Return JSON per schema.\n",
    );
    for (i, it) in items.iter().enumerate() {
        prompt.push_str(&format!(
            "\n[{n}] TITLE: {title}\nOUTLET: {outlet}\nURL: {url}\nSNIPPET: {snippet}\n",
            n = i + 1,
            title = it.title,
            outlet = it.source_host,
            url = it.link,
            snippet = it.snippet,
        ));
    }
    prompt
}

/// One request per article; uses the fetched body when there is one, the
/// snippet when the fetch failed.
fn article_prompt(article: &ArticleText) -> String {
    let text = if article.fetched {
        article.body.as_str()
    } else {
        article.item.snippet.as_str()
    };
    format!(
        "From the article below, list any business opening or closure events \
         it clearly reports (Singapore focus). If unsure, return an empty \
         list. Return JSON per schema.\n\nTITLE: {title}\nOUTLET: {outlet}\nURL: {url}\nTEXT: {text}\n",
        title = article.item.title,
        outlet = article.item.source_host,
        url = article.item.link,
    )
}
