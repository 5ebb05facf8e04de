// src/api.rs
// HTTP surface: the render sink (`GET /news`), the status channel
// (`GET /news/status`) and the manual trigger (`POST /news/refresh`).
// Concurrent triggers are serialized with queue-and-reject: a refresh while
// a run is in flight gets a busy response.

use std::sync::{Arc, RwLock};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::config::Credentials;
use crate::pipeline;
use crate::status::SharedStatus;
use crate::types::FilteredEvent;

#[derive(Clone)]
pub struct AppState {
    pub creds: Arc<Credentials>,
    pub status: SharedStatus,
    pub latest: Arc<RwLock<Vec<FilteredEvent>>>,
    pub running: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(creds: Credentials) -> Self {
        Self {
            creds: Arc::new(creds),
            status: SharedStatus::new(),
            latest: Arc::new(RwLock::new(Vec::new())),
            running: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/news", get(news))
        .route("/news/status", get(news_status))
        .route("/news/refresh", post(refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Start a pipeline run unless one is already in flight. Returns false when
/// rejected.
pub fn try_start_run(state: &AppState) -> bool {
    let Ok(guard) = state.running.clone().try_lock_owned() else {
        return false;
    };
    let st = state.clone();
    tokio::spawn(async move {
        let _guard = guard;
        let events = pipeline::run(&st.creds, &st.status).await;
        if let Ok(mut g) = st.latest.write() {
            *g = events;
        }
    });
    true
}

/// Row shape consumed by the dashboard table; the ordinal is assigned here,
/// at render time.
#[derive(serde::Serialize)]
struct NewsRow {
    rank: usize,
    #[serde(flatten)]
    event: FilteredEvent,
}

async fn news(State(state): State<AppState>) -> Json<Vec<NewsRow>> {
    let events = state.latest.read().map(|g| g.clone()).unwrap_or_default();
    let rows = events
        .into_iter()
        .enumerate()
        .map(|(i, event)| NewsRow { rank: i + 1, event })
        .collect();
    Json(rows)
}

#[derive(serde::Serialize)]
struct StatusResp {
    status: String,
}

async fn news_status(State(state): State<AppState>) -> Json<StatusResp> {
    Json(StatusResp {
        status: state.status.get(),
    })
}

async fn refresh(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    if try_start_run(&state) {
        (StatusCode::ACCEPTED, Json(json!({"status": "started"})))
    } else {
        (StatusCode::CONFLICT, Json(json!({"status": "busy"})))
    }
}
