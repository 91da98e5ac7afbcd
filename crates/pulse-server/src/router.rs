//! Axum router wiring.
//!
//! Routing is owned by the [`Dispatcher`](crate::dispatch::Dispatcher); axum
//! only hands every request to the instrumented entry point.

use axum::Router;

use crate::{app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(transport::http::entry)
        .with_state(state)
}
