// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /news (empty render sink, rank assignment)
// - GET /news/status
// - POST /news/refresh (accept + busy rejection)

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use shopwatch::api::{self, AppState};
use shopwatch::config::Credentials;
use shopwatch::types::{CandidateEvent, EventType};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn test_state() -> AppState {
    // Empty credentials: a triggered run halts on ConfigurationNeeded
    // before any network call.
    AppState::new(Credentials::default())
}

fn test_router(state: AppState) -> Router {
    api::router(state)
}

async fn json_body(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn health_returns_200_and_ok_body() {
    let app = test_router(test_state());

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).unwrap().trim(), "ok");
}

#[tokio::test]
async fn news_renders_ordinals_in_input_order() {
    let state = test_state();
    {
        let mut g = state.latest.write().unwrap();
        for (i, ty) in [EventType::Opening, EventType::Closure].iter().enumerate() {
            g.push(CandidateEvent {
                event_type: *ty,
                business_name: format!("biz-{i}"),
                location: None,
                headline: format!("headline-{i}"),
                date: None,
                source_url: format!("https://a.test/{i}"),
                source_outlet: "a.test".to_string(),
                confidence: Some(0.8),
            });
        }
    }
    let app = test_router(state);

    let req = Request::builder()
        .method("GET")
        .uri("/news")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.expect("oneshot /news");
    assert!(resp.status().is_success());

    let v = json_body(resp).await;
    let rows = v.as_array().expect("array response");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[1]["rank"], 2);
    assert_eq!(rows[0]["businessName"], "biz-0");
    assert_eq!(rows[1]["eventType"], "closure");
}

#[tokio::test]
async fn status_starts_idle() {
    let app = test_router(test_state());

    let req = Request::builder()
        .method("GET")
        .uri("/news/status")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.expect("oneshot /news/status");
    let v = json_body(resp).await;
    assert_eq!(v["status"], "Idle");
}

#[tokio::test]
async fn refresh_without_credentials_ends_in_configuration_needed() {
    let state = test_state();
    let app = test_router(state.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/news/refresh")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.expect("oneshot refresh");
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    // The run is spawned; give it a moment, then observe the terminal status.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(
        state.status.get(),
        "Configuration needed: add a news-search or web-search API key"
    );
}

#[tokio::test]
async fn refresh_is_rejected_while_a_run_is_in_flight() {
    let state = test_state();
    let app = test_router(state.clone());

    // Simulate an in-flight run by holding the guard.
    let _guard = state.running.clone().try_lock_owned().expect("free lock");

    let req = Request::builder()
        .method("POST")
        .uri("/news/refresh")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.expect("oneshot refresh");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let v = json_body(resp).await;
    assert_eq!(v["status"], "busy");
}
