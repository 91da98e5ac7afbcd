#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use axum::http::{header::CONTENT_TYPE, Method, StatusCode};
use chrono::DateTime;
use serde_json::Value;

use common::*;

fn json(body: &str) -> Value {
    assert!(body.ends_with('\n'), "json bodies end with a newline");
    serde_json::from_str(body).unwrap()
}

fn assert_rfc3339(v: &Value) {
    let s = v.as_str().expect("timestamp is a string");
    DateTime::parse_from_rfc3339(s).expect("valid RFC 3339");
}

#[tokio::test]
async fn home_page_is_html() {
    let (_state, app) = app(test_config(0.5));
    let res = send(&app, Method::GET, "/").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    let body = body_text(res).await;
    assert!(body.contains("<code>GET /metrics</code>"));
}

#[tokio::test]
async fn probes() {
    let (_state, app) = app(test_config(0.5));

    let res = send(&app, Method::GET, "/health").await;
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    let v = json(&body_text(res).await);
    assert_eq!(v["status"], "healthy");
    assert_rfc3339(&v["timestamp"]);

    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    let v = json(&body);
    assert_eq!(v["status"], "ready");
    assert_rfc3339(&v["timestamp"]);
}

#[tokio::test]
async fn version_reports_configured_version() {
    let mut cfg = test_config(0.5);
    cfg.app.version = "v2.3.4-canary".into();
    let (_state, app) = app(cfg);

    let (status, body) = get(&app, "/version").await;
    assert_eq!(status, StatusCode::OK);
    let v = json(&body);
    assert_eq!(v["version"], "v2.3.4-canary");
    assert_rfc3339(&v["buildTime"]);

    // build time is fixed at startup
    let (_, again) = get(&app, "/version").await;
    assert_eq!(json(&again)["buildTime"], v["buildTime"]);
}

#[tokio::test]
async fn api_data_shape() {
    let (_state, app) = app(test_config(0.5));
    let (status, body) = get(&app, "/api/data").await;
    assert_eq!(status, StatusCode::OK);

    let v = json(&body);
    assert_eq!(v["status"], "success");
    assert!(v["message"].is_string());
    assert!(v["random"].as_u64().unwrap() < 1000);
    assert_rfc3339(&v["timestamp"]);
}

#[tokio::test]
async fn api_slow_waits_for_configured_delay() {
    let (_state, app) = app(test_config(0.5));

    let start = std::time::Instant::now();
    let (status, body) = get(&app, "/api/slow").await;
    assert!(start.elapsed() >= std::time::Duration::from_millis(50));
    assert_eq!(status, StatusCode::OK);

    let v = json(&body);
    assert_eq!(v["delay"], "50ms");
    assert_eq!(v["message"], "This was a slow endpoint");
}

#[tokio::test]
async fn api_error_bodies() {
    let (_state, app) = app(test_config(1.0));
    let (status, body) = get(&app, "/api/error").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let v = json(&body);
    assert_eq!(v["error"], "Internal server error");
    assert_rfc3339(&v["timestamp"]);

    let (_state, app) = common::app(test_config(0.0));
    let (status, body) = get(&app, "/api/error").await;
    assert_eq!(status, StatusCode::OK);
    let v = json(&body);
    assert_eq!(v["lucky"], true);
}

#[tokio::test]
async fn escaped_path_is_served_and_labeled_decoded() {
    let (state, app) = app(test_config(0.5));
    let (status, body) = get(&app, "/api/%64ata").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "success");

    assert_eq!(requests_total(&state, "GET", "/api/data", "200"), Some(1.0));
    assert_eq!(requests_total(&state, "GET", "/api/%64ata", "200"), None);
    assert_eq!(state.metrics().api_calls().value(&["/api/data", "success"]), Some(1.0));
}

#[tokio::test]
async fn unknown_path_is_404() {
    let (_state, app) = app(test_config(0.5));
    let res = send(&app, Method::GET, "/does/not/exist").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(body_text(res).await, "404 page not found\n");
}
