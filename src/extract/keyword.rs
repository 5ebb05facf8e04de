// src/extract/keyword.rs
// Deterministic keyword classifier: always available, no credential needed.
// Two fixed patterns; opening is checked before closure, so a text matching
// both classifies as opening. No match yields no event.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ArticleText, CandidateEvent, EventType, SearchResultItem};

/// Keyword events carry a fixed, deliberately low confidence.
pub const SNIPPET_CONFIDENCE: f32 = 0.4;
pub const ARTICLE_CONFIDENCE: f32 = 0.5;

static OPENING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(opens?|opening|launch(?:es|ed)?|debuts?|set to open|grand opening)\b")
        .expect("valid opening pattern")
});

static CLOSURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(closes?|closing|closure|closed|shut(?:s|ting)?\s+down|shutters?|cease[sd]?\s+operations?)\b",
    )
    .expect("valid closure pattern")
});

/// First matching pattern wins; opening before closure.
pub fn classify(text: &str) -> Option<EventType> {
    if OPENING_RE.is_match(text) {
        Some(EventType::Opening)
    } else if CLOSURE_RE.is_match(text) {
        Some(EventType::Closure)
    } else {
        None
    }
}

/// Text preceding the first colon in the title, or the full title when no
/// colon is present.
pub fn business_name_from_title(title: &str) -> String {
    match title.split_once(':') {
        Some((before, _)) if !before.trim().is_empty() => before.trim().to_string(),
        _ => title.trim().to_string(),
    }
}

/// Classify one search hit from its title + snippet. At most one event.
pub fn extract_from_snippet(item: &SearchResultItem) -> Option<CandidateEvent> {
    let text = format!("{} {}", item.title, item.snippet);
    build_event(item, classify(&text)?, SNIPPET_CONFIDENCE)
}

/// Classify from the fetched body when available, otherwise the snippet.
pub fn extract_from_article(article: &ArticleText) -> Option<CandidateEvent> {
    if !article.fetched {
        return extract_from_snippet(&article.item);
    }
    let text = format!("{} {}", article.item.title, article.body);
    build_event(&article.item, classify(&text)?, ARTICLE_CONFIDENCE)
}

fn build_event(
    item: &SearchResultItem,
    event_type: EventType,
    confidence: f32,
) -> Option<CandidateEvent> {
    // The invariant requires a citable source; items without one yield nothing.
    if item.link.is_empty() || item.source_host.is_empty() {
        return None;
    }
    Some(CandidateEvent {
        event_type,
        business_name: business_name_from_title(&item.title),
        location: None,
        headline: item.title.clone(),
        date: None,
        source_url: item.link.clone(),
        source_outlet: item.source_host.clone(),
        confidence: Some(confidence),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_wins_when_both_patterns_match() {
        let t = "Mall opens new wing as old tenant closes";
        assert_eq!(classify(t), Some(EventType::Opening));
    }

    #[test]
    fn closure_phrases_match() {
        assert_eq!(classify("Retailer shutting down all outlets"), Some(EventType::Closure));
        assert_eq!(classify("Cafe to cease operations"), Some(EventType::Closure));
        assert_eq!(classify("Store closed after 40 years"), Some(EventType::Closure));
    }

    #[test]
    fn no_match_yields_nothing() {
        assert_eq!(classify("Weather stays humid this week"), None);
    }

    #[test]
    fn classification_is_deterministic() {
        let t = "New bakery launches at Orchard";
        assert_eq!(classify(t), classify(t));
    }

    #[test]
    fn business_name_uses_text_before_first_colon() {
        assert_eq!(business_name_from_title("Din Tai Fung: new outlet at Jewel"), "Din Tai Fung");
        assert_eq!(
            business_name_from_title("New cafe opens in Tampines"),
            "New cafe opens in Tampines"
        );
    }
}
