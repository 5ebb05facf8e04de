// src/filter.rs
// Result Filter stage: pure, deterministic. Keeps opening/closure events at
// or above the confidence floor; a missing confidence is not a rejection
// reason. Input order is preserved; ordinals are assigned at render time.

use crate::types::{CandidateEvent, EventType, FilteredEvent};

pub const MIN_CONFIDENCE: f32 = 0.5;

pub fn filter_events(candidates: Vec<CandidateEvent>) -> Vec<FilteredEvent> {
    candidates
        .into_iter()
        .filter(|ev| {
            matches!(ev.event_type, EventType::Opening | EventType::Closure)
                && ev.confidence.is_none_or(|c| c >= MIN_CONFIDENCE)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(event_type: EventType, confidence: Option<f32>, name: &str) -> CandidateEvent {
        CandidateEvent {
            event_type,
            business_name: name.to_string(),
            location: None,
            headline: name.to_string(),
            date: None,
            source_url: "https://a.test/1".to_string(),
            source_outlet: "a.test".to_string(),
            confidence,
        }
    }

    #[test]
    fn keeps_exactly_the_on_taxonomy_confident_subset_in_order() {
        let input = vec![
            ev(EventType::Opening, Some(0.9), "keep-1"),
            ev(EventType::Relocation, Some(0.9), "off-taxonomy"),
            ev(EventType::Closure, Some(0.5), "keep-2"),
            ev(EventType::Opening, Some(0.49), "low-confidence"),
            ev(EventType::Reopening, None, "off-taxonomy-2"),
            ev(EventType::Closure, None, "keep-3"),
        ];
        let out = filter_events(input);
        let names: Vec<&str> = out.iter().map(|e| e.business_name.as_str()).collect();
        assert_eq!(names, vec!["keep-1", "keep-2", "keep-3"]);
    }

    #[test]
    fn missing_confidence_passes() {
        let out = filter_events(vec![ev(EventType::Opening, None, "x")]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn boundary_confidence_is_kept() {
        let out = filter_events(vec![ev(EventType::Closure, Some(MIN_CONFIDENCE), "x")]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(filter_events(Vec::new()).is_empty());
    }
}
