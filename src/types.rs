// src/types.rs
// Per-run data model for the news pipeline. Every value lives for exactly
// one pipeline invocation; each stage owns its output list until it hands
// it to the next stage.

use serde::{Deserialize, Serialize};

/// One normalized search hit, whatever backend produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResultItem {
    pub title: String,
    pub link: String,
    /// May still contain markup when it arrives from a backend; cleaned
    /// before classification.
    pub snippet: String,
    /// Host part of `link`; empty when the link is malformed.
    pub source_host: String,
}

impl SearchResultItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>, snippet: impl Into<String>) -> Self {
        let link = link.into();
        let source_host = host_of(&link);
        Self {
            title: title.into(),
            link,
            snippet: snippet.into(),
            source_host,
        }
    }
}

/// Extract the host from a URL string without treating malformed input as
/// an error: anything we cannot parse yields an empty host.
pub fn host_of(link: &str) -> String {
    let rest = match link.split_once("://") {
        Some((_, r)) => r,
        None => return String::new(),
    };
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    // Drop userinfo and port.
    let host = authority.rsplit('@').next().unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    host.to_ascii_lowercase()
}

/// Fetched article body for one search hit. A body that never cleared the
/// usable-content threshold leaves `fetched == false` and an empty body;
/// downstream must use the item's snippet instead.
#[derive(Debug, Clone)]
pub struct ArticleText {
    pub item: SearchResultItem,
    pub body: String,
    pub fetched: bool,
}

impl ArticleText {
    pub fn unfetched(item: SearchResultItem) -> Self {
        Self {
            item,
            body: String::new(),
            fetched: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Opening,
    Closure,
    Reopening,
    Relocation,
}

/// Unfiltered extractor output. May be off-taxonomy or low-confidence;
/// the filter stage decides what survives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEvent {
    pub event_type: EventType,
    pub business_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub headline: String,
    /// Free-form date string as reported; never parsed.
    #[serde(default)]
    pub date: Option<String>,
    pub source_url: String,
    pub source_outlet: String,
    /// Missing confidence is tolerated here; the filter treats it as a pass.
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl CandidateEvent {
    /// Parse one record out of a model payload. Records that cannot populate
    /// the required fields are dropped, never emitted with placeholders.
    pub fn from_value(v: &serde_json::Value) -> Option<Self> {
        let ev: CandidateEvent = serde_json::from_value(v.clone()).ok()?;
        if ev.business_name.trim().is_empty()
            || ev.source_url.trim().is_empty()
            || ev.source_outlet.trim().is_empty()
        {
            return None;
        }
        Some(ev)
    }
}

/// A candidate that survived the filter: `event_type` is opening or closure
/// and confidence (when present) is at least the minimum. Ordinal ranking is
/// assigned only at render time.
pub type FilteredEvent = CandidateEvent;
