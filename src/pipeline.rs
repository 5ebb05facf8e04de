// src/pipeline.rs
// Orchestration: query -> search -> fetch -> extract -> filter, one run per
// trigger. No error escapes this module; every stage degrades to the next
// fallback or an empty result, and each run ends in exactly one terminal
// status.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::config::Credentials;
use crate::extract::{self, Strategy};
use crate::fetch::{self, ArticleFetcher, ProxyReaderFetcher};
use crate::filter::filter_events;
use crate::search::{self, SearchBackend};
use crate::status::{Phase, StatusSink};
use crate::types::FilteredEvent;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "news_search_backend_errors_total",
            "Search backend failures recovered by fallback."
        );
        describe_counter!(
            "news_search_proxy_retries_total",
            "Direct search calls retried through pass-through proxies."
        );
        describe_counter!("news_fetch_failures_total", "Items with no usable article body.");
        describe_counter!(
            "news_extract_fallback_total",
            "Model extraction failures recovered by the keyword strategy."
        );
        describe_counter!("news_candidates_total", "Candidate events out of the extractor.");
        describe_counter!("news_events_kept_total", "Events kept by the filter.");
        describe_gauge!("news_pipeline_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// Run the whole pipeline with production components wired from the given
/// credentials. The credentials object is the only configuration input;
/// nothing here reads process-global state.
pub async fn run(creds: &Credentials, status: &dyn StatusSink) -> Vec<FilteredEvent> {
    let backends = search::default_backends(creds);
    let fetcher: Arc<dyn ArticleFetcher> = Arc::new(ProxyReaderFetcher::new());
    let strategy = Strategy::from_credentials(creds);
    run_with(&backends, fetcher, &strategy, status).await
}

/// Same pipeline with injected stage implementations, so fallback chains are
/// testable without network I/O.
pub async fn run_with(
    backends: &[Box<dyn SearchBackend>],
    fetcher: Arc<dyn ArticleFetcher>,
    strategy: &Strategy,
    status: &dyn StatusSink,
) -> Vec<FilteredEvent> {
    ensure_metrics_described();

    // Halt before any network call when no backend is usable.
    if !search::any_configured(backends) {
        status.update(Phase::ConfigurationNeeded);
        return Vec::new();
    }

    status.update(Phase::Searching);
    let items = search::search_with_fallback(backends, &search::build_query()).await;
    if items.is_empty() {
        status.update(Phase::NoResults);
        finish_metrics(0, 0);
        return Vec::new();
    }

    status.update(Phase::Fetching);
    let articles = fetch::fetch_batch(fetcher, &items).await;

    status.update(Phase::Extracting);
    // Higher-precision pass first: best available text per item. A non-empty
    // result suppresses the snippet pass even when its confidence is low.
    let mut outcome = extract::extract_articles(strategy, &articles).await;
    if outcome.fell_back {
        status.update(Phase::FallingBack);
    }
    if outcome.events.is_empty() {
        let snippet_outcome = extract::extract_snippets(strategy, &items).await;
        if snippet_outcome.fell_back {
            status.update(Phase::FallingBack);
        }
        outcome.events = snippet_outcome.events;
    }

    let candidates = outcome.events;
    let candidate_count = candidates.len();
    let filtered = filter_events(candidates);
    finish_metrics(filtered.len(), candidate_count);

    status.update(Phase::Done(filtered.len()));
    filtered
}

fn finish_metrics(kept: usize, candidates: usize) {
    counter!("news_candidates_total").increment(candidates as u64);
    counter!("news_events_kept_total").increment(kept as u64);
    let now = chrono::Utc::now().timestamp().max(0) as f64;
    gauge!("news_pipeline_last_run_ts").set(now);
}
