// src/lib.rs
// Public library surface for the server binary and integration tests.

pub mod api;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod metrics;
pub mod pipeline;
pub mod search;
pub mod status;
pub mod text;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::Credentials;
pub use crate::types::{CandidateEvent, EventType, FilteredEvent, SearchResultItem};
