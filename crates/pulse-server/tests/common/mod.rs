//! Shared helpers for router-level tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use pulse_server::app_state::AppState;
use pulse_server::config::AppConfig;
use pulse_server::dispatch::Dispatcher;
use pulse_server::router;

/// Config with fast demo endpoints.
pub fn test_config(error_probability: f64) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.demo.slow_delay_ms = 50;
    cfg.demo.error_probability = error_probability;
    cfg
}

pub fn app(cfg: AppConfig) -> (AppState, Router) {
    let state = AppState::new(cfg).expect("state");
    let app = router::build_router(state.clone());
    (state, app)
}

pub fn app_with(dispatcher: Dispatcher) -> (AppState, Router) {
    let state = AppState::with_dispatcher(test_config(0.5), dispatcher).expect("state");
    let app = router::build_router(state.clone());
    (state, app)
}

pub fn request(method: Method, path: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, method: Method, path: &str) -> Response {
    app.clone().oneshot(request(method, path)).await.unwrap()
}

pub async fn get(app: &Router, path: &str) -> (StatusCode, String) {
    let res = send(app, Method::GET, path).await;
    let status = res.status();
    (status, body_text(res).await)
}

pub async fn body_text(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn in_flight(state: &AppState) -> f64 {
    state.metrics().in_flight().value(&[]).unwrap()
}

pub fn requests_total(state: &AppState, method: &str, path: &str, status: &str) -> Option<f64> {
    state
        .metrics()
        .requests_total()
        .value(&[method, path, status])
}
