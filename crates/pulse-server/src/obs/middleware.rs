//! Metrics middleware.
//!
//! Wraps the dispatcher so every request is measured the same way regardless
//! of which handler serves it. The scrape path bypasses instrumentation so a
//! scrape never inflates its own series.

use std::time::Instant;

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use pulse_core::metrics::{MetricHandle, Registry, TEXT_CONTENT_TYPE};

use crate::app_state::AppState;
use crate::dispatch::RequestHead;
use crate::obs::metrics::RequestOutcome;
use crate::transport::sink::{BufferedResponse, StatusCapture};

pub const METRICS_PATH: &str = "/metrics";

/// Serve one request through the instrumented dispatcher.
pub async fn handle(state: &AppState, head: RequestHead) -> Response {
    if head.path() == METRICS_PATH {
        return scrape(state.registry());
    }

    let metrics = state.metrics();
    let in_flight = InFlightGuard::enter(metrics.in_flight());
    let start = Instant::now();

    let mut sink = StatusCapture::new(BufferedResponse::new());
    state.dispatcher().dispatch(&head, &mut sink).await;

    in_flight.complete();
    let outcome = RequestOutcome {
        method: head.method().clone(),
        path: head.path().to_string(),
        status: sink.status(),
        duration: start.elapsed(),
    };

    if let Err(e) = metrics.record(&outcome) {
        tracing::error!(
            error = %e,
            kind = e.kind(),
            path = %outcome.path,
            "failed to record request metrics"
        );
    }
    tracing::debug!(
        method = %outcome.method,
        path = %outcome.path,
        status = outcome.status.as_u16(),
        elapsed_ms = outcome.duration.as_secs_f64() * 1000.0,
        "request served"
    );

    sink.into_inner().into_response()
}

/// Render the registry for the scrape endpoint.
pub fn scrape(registry: &Registry) -> Response {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, TEXT_CONTENT_TYPE)],
        registry.render(),
    )
        .into_response()
}

/// Keeps the in-flight gauge paired: +1 on entry, -1 on drop.
///
/// Dropping without `complete` means the request future was cancelled
/// (client went away or the shutdown window closed); the gauge is still
/// decremented but no request sample is recorded.
struct InFlightGuard<'a> {
    gauge: &'a MetricHandle,
    completed: bool,
}

impl<'a> InFlightGuard<'a> {
    fn enter(gauge: &'a MetricHandle) -> Self {
        if let Err(e) = gauge.inc(&[]) {
            tracing::error!(error = %e, "in-flight increment failed");
        }
        Self {
            gauge,
            completed: false,
        }
    }

    fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.gauge.dec(&[]) {
            tracing::error!(error = %e, "in-flight decrement failed");
        }
        if !self.completed {
            tracing::debug!("request dropped before completion");
        }
    }
}
