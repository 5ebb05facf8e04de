// src/status.rs
// Single human-readable status string, updated at each pipeline phase
// transition. The pipeline reports through the `StatusSink` seam so tests
// can capture transitions without shared server state.

use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ConfigurationNeeded,
    Searching,
    Fetching,
    Extracting,
    /// Informational: model extraction failed and the keyword strategy took
    /// over for the same input. Never terminal.
    FallingBack,
    NoResults,
    Done(usize),
    Failed,
}

impl Phase {
    pub fn message(&self) -> String {
        match self {
            Phase::Idle => "Idle".to_string(),
            Phase::ConfigurationNeeded => {
                "Configuration needed: add a news-search or web-search API key".to_string()
            }
            Phase::Searching => "Searching news...".to_string(),
            Phase::Fetching => "Fetching articles...".to_string(),
            Phase::Extracting => "Extracting events...".to_string(),
            Phase::FallingBack => {
                "Model extraction unavailable, falling back to keyword matching".to_string()
            }
            Phase::NoResults => "No results".to_string(),
            Phase::Done(0) => "No opening/closure headlines detected".to_string(),
            Phase::Done(n) => format!("Found {n} events"),
            Phase::Failed => "Failed to load news".to_string(),
        }
    }
}

pub trait StatusSink: Send + Sync {
    fn update(&self, phase: Phase);
}

/// Shared status slot used by the HTTP surface.
#[derive(Clone, Default)]
pub struct SharedStatus {
    inner: Arc<RwLock<String>>,
}

impl SharedStatus {
    pub fn new() -> Self {
        let s = Self::default();
        s.update(Phase::Idle);
        s
    }

    pub fn get(&self) -> String {
        self.inner.read().map(|g| g.clone()).unwrap_or_default()
    }
}

impl StatusSink for SharedStatus {
    fn update(&self, phase: Phase) {
        if let Ok(mut g) = self.inner.write() {
            *g = phase.message();
        }
    }
}

/// Sink that drops every update; handy for callers without a UI.
pub struct NullSink;

impl StatusSink for NullSink {
    fn update(&self, _phase: Phase) {}
}
