#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header::CONTENT_TYPE, Method, StatusCode};
use tower::ServiceExt;

use pulse_server::dispatch::{Dispatcher, Handler, RequestHead};
use pulse_server::transport::sink::ResponseSink;

use common::*;

#[tokio::test]
async fn in_flight_returns_to_baseline_after_every_request() {
    let (state, app) = app(test_config(0.5));
    assert_eq!(in_flight(&state), 0.0);

    for path in ["/", "/health", "/ready", "/version", "/api/data", "/api/error", "/nope"] {
        let _ = get(&app, path).await;
        assert_eq!(in_flight(&state), 0.0, "after {path}");
    }
}

#[tokio::test]
async fn in_flight_tracks_concurrent_requests() {
    let mut cfg = test_config(0.5);
    cfg.demo.slow_delay_ms = 300;
    let (state, app) = app(cfg);

    let a = tokio::spawn({
        let app = app.clone();
        async move { get(&app, "/api/slow").await }
    });
    let b = tokio::spawn({
        let app = app.clone();
        async move { get(&app, "/api/slow").await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(in_flight(&state), 2.0);

    assert_eq!(a.await.unwrap().0, StatusCode::OK);
    assert_eq!(b.await.unwrap().0, StatusCode::OK);
    assert_eq!(in_flight(&state), 0.0);
    assert_eq!(requests_total(&state, "GET", "/api/slow", "200"), Some(2.0));
}

#[tokio::test]
async fn cancelled_request_still_decrements_in_flight() {
    let mut cfg = test_config(0.5);
    cfg.demo.slow_delay_ms = 5_000;
    let (state, app) = app(cfg);

    let pending = app.clone().oneshot(request(Method::GET, "/api/slow"));
    let res = tokio::time::timeout(Duration::from_millis(50), pending).await;
    assert!(res.is_err(), "slow request must still be running");

    assert_eq!(in_flight(&state), 0.0);
    assert_eq!(requests_total(&state, "GET", "/api/slow", "200"), None);
}

#[tokio::test]
async fn one_sample_per_request_labeled_with_written_status() {
    let (state, app) = app(test_config(1.0));

    assert_eq!(get(&app, "/health").await.0, StatusCode::OK);
    assert_eq!(get(&app, "/missing").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/api/error").await.0, StatusCode::INTERNAL_SERVER_ERROR);
    let _ = send(&app, Method::POST, "/health").await;

    assert_eq!(requests_total(&state, "GET", "/health", "200"), Some(1.0));
    assert_eq!(requests_total(&state, "POST", "/health", "200"), Some(1.0));
    assert_eq!(requests_total(&state, "GET", "/missing", "404"), Some(1.0));
    assert_eq!(requests_total(&state, "GET", "/api/error", "500"), Some(1.0));
    assert_eq!(requests_total(&state, "GET", "/api/error", "200"), None);

    let duration = state.metrics().request_duration();
    for (method, path, status) in [
        ("GET", "/health", "200"),
        ("GET", "/missing", "404"),
        ("GET", "/api/error", "500"),
    ] {
        let snap = duration.histogram(&[method, path, status]).expect("observed");
        assert_eq!(snap.count, 1, "{method} {path} {status}");
    }
}

struct Rewrites;

#[async_trait]
impl Handler for Rewrites {
    async fn serve(&self, _req: &RequestHead, sink: &mut dyn ResponseSink) {
        sink.write_status(StatusCode::CREATED);
        sink.write_status(StatusCode::INTERNAL_SERVER_ERROR);
        sink.write_body(b"created");
        sink.write_status(StatusCode::BAD_GATEWAY);
    }
}

struct Silent;

#[async_trait]
impl Handler for Silent {
    async fn serve(&self, _req: &RequestHead, _sink: &mut dyn ResponseSink) {}
}

#[tokio::test]
async fn first_status_write_wins() {
    let d = Dispatcher::new();
    d.register("/api/rewrite", Arc::new(Rewrites));
    let (state, app) = app_with(d);

    let (status, body) = get(&app, "/api/rewrite").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, "created");

    assert_eq!(requests_total(&state, "GET", "/api/rewrite", "201"), Some(1.0));
    assert_eq!(requests_total(&state, "GET", "/api/rewrite", "500"), None);
    assert_eq!(state.metrics().api_calls().value(&["/api/rewrite", "success"]), Some(1.0));
    assert_eq!(state.metrics().error_rate().value(&[]), Some(0.0));
}

#[tokio::test]
async fn handler_writing_nothing_is_recorded_as_ok() {
    let d = Dispatcher::new();
    d.register("/quiet", Arc::new(Silent));
    let (state, app) = app_with(d);

    let (status, body) = get(&app, "/quiet").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(requests_total(&state, "GET", "/quiet", "200"), Some(1.0));
}

#[tokio::test]
async fn scrape_is_not_instrumented() {
    let (state, app) = app(test_config(0.5));
    let _ = get(&app, "/health").await;

    for _ in 0..3 {
        let res = send(&app, Method::GET, "/metrics").await;
        assert_eq!(res.status(), StatusCode::OK);
        let ct = res.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(ct.contains("text/plain"));
        assert!(ct.contains("version=0.0.4"));
    }

    let (_, body) = get(&app, "/metrics").await;
    assert!(!body.contains("endpoint=\"/metrics\""));
    assert_eq!(requests_total(&state, "GET", "/metrics", "200"), None);
    assert_eq!(in_flight(&state), 0.0);
    assert!(body.contains(
        "http_requests_total{method=\"GET\",endpoint=\"/health\",status=\"200\"} 1\n"
    ));
}

#[tokio::test]
async fn scrape_lists_every_metric_and_is_stable() {
    let (_state, app) = app(test_config(0.5));
    let _ = get(&app, "/api/data").await;

    let (_, first) = get(&app, "/metrics").await;
    let (_, second) = get(&app, "/metrics").await;
    assert_eq!(first, second);

    for name in [
        "http_requests_total",
        "http_request_duration_seconds",
        "http_requests_in_flight",
        "api_calls_total",
        "error_rate_total",
    ] {
        assert!(first.contains(&format!("# TYPE {name} ")), "{name} missing");
    }
    assert!(first.contains(
        "http_request_duration_seconds_bucket\
         {method=\"GET\",endpoint=\"/api/data\",status=\"200\",le=\"+Inf\"} 1\n"
    ));
    assert!(first.contains("http_requests_in_flight 0\n"));
}

#[tokio::test]
async fn non_api_paths_never_count_api_calls() {
    let (state, app) = app(test_config(1.0));
    for path in ["/", "/health", "/ready", "/version", "/api", "/nope"] {
        let _ = get(&app, path).await;
    }

    let (_, body) = get(&app, "/metrics").await;
    assert!(!body.contains("api_calls_total{"));
    assert_eq!(state.metrics().error_rate().value(&[]), Some(0.0));
    assert_eq!(state.metrics().api_calls().value(&["/api", "error"]), None);
}

#[tokio::test]
async fn prefix_matched_paths_count_as_api_calls() {
    let (state, app) = app(test_config(1.0));
    let (status, _) = get(&app, "/apis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let _ = get(&app, "/api-v2/x").await;

    let api = state.metrics().api_calls();
    assert_eq!(api.value(&["/apis", "error"]), Some(1.0));
    assert_eq!(api.value(&["/api-v2/x", "error"]), Some(1.0));
    assert_eq!(state.metrics().error_rate().value(&[]), Some(2.0));
}

#[tokio::test]
async fn unknown_api_path_counts_as_error() {
    let (state, app) = app(test_config(0.5));
    let (status, _) = get(&app, "/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(state.metrics().api_calls().value(&["/api/unknown", "error"]), Some(1.0));
    assert_eq!(state.metrics().error_rate().value(&[]), Some(1.0));
}

#[tokio::test]
async fn api_data_thousand_calls() {
    let (state, app) = app(test_config(0.5));

    for _ in 0..1000 {
        let (status, body) = get(&app, "/api/data").await;
        assert_eq!(status, StatusCode::OK);
        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        let random = v["random"].as_u64().expect("random is a number");
        assert!(random < 1000);
    }

    let api = state.metrics().api_calls();
    assert_eq!(api.value(&["/api/data", "success"]), Some(1000.0));
    assert_eq!(api.value(&["/api/data", "error"]), None);
    assert_eq!(requests_total(&state, "GET", "/api/data", "200"), Some(1000.0));
}

#[tokio::test]
async fn api_error_rate_converges_to_configured_probability() {
    const N: usize = 2000;
    let (state, app) = app(test_config(0.5));

    for _ in 0..N {
        let _ = get(&app, "/api/error").await;
    }

    let api = state.metrics().api_calls();
    let errors = api.value(&["/api/error", "error"]).unwrap_or(0.0);
    let successes = api.value(&["/api/error", "success"]).unwrap_or(0.0);
    assert_eq!(errors + successes, N as f64);

    // 0.5 +/- 0.1 is ~9 standard deviations at N = 2000
    let ratio = errors / N as f64;
    assert!((0.4..=0.6).contains(&ratio), "error ratio {ratio}");
    assert_eq!(state.metrics().error_rate().value(&[]), Some(errors));
}
