//! HTTP metric set recorded for every instrumented request.

use std::time::Duration;

use axum::http::{Method, StatusCode};
use pulse_core::error::Result;
use pulse_core::metrics::{MetricHandle, MetricKind, Registry};

/// Paths strictly longer than this prefix and starting with it count as API
/// calls (`/api/data`, `/apis`, `/api-v2/x`; not `/api` itself).
pub const API_PREFIX: &str = "/api";

/// One finished request, consumed immediately by [`HttpMetrics::record`].
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub duration: Duration,
}

/// Handles for the service's metric definitions.
#[derive(Debug, Clone)]
pub struct HttpMetrics {
    requests_total: MetricHandle,
    request_duration: MetricHandle,
    in_flight: MetricHandle,
    api_calls: MetricHandle,
    error_rate: MetricHandle,
}

impl HttpMetrics {
    /// Define the metric set on `registry`. Fails if any name is taken.
    pub fn register(registry: &Registry) -> Result<Self> {
        let labels = ["method", "endpoint", "status"];
        Ok(Self {
            requests_total: registry.define(
                "http_requests_total",
                "Total number of HTTP requests",
                MetricKind::Counter,
                &labels,
            )?,
            request_duration: registry.define(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
                MetricKind::Histogram,
                &labels,
            )?,
            in_flight: registry.define(
                "http_requests_in_flight",
                "Number of HTTP requests currently being processed",
                MetricKind::Gauge,
                &[],
            )?,
            api_calls: registry.define(
                "api_calls_total",
                "Total number of API calls",
                MetricKind::Counter,
                &["endpoint", "result"],
            )?,
            error_rate: registry.define(
                "error_rate_total",
                "Total number of errors",
                MetricKind::Counter,
                &[],
            )?,
        })
    }

    pub fn requests_total(&self) -> &MetricHandle {
        &self.requests_total
    }

    pub fn request_duration(&self) -> &MetricHandle {
        &self.request_duration
    }

    pub fn in_flight(&self) -> &MetricHandle {
        &self.in_flight
    }

    pub fn api_calls(&self) -> &MetricHandle {
        &self.api_calls
    }

    pub fn error_rate(&self) -> &MetricHandle {
        &self.error_rate
    }

    /// Count the request and its duration under (method, endpoint, status);
    /// API paths also count one success/error outcome.
    pub fn record(&self, outcome: &RequestOutcome) -> Result<()> {
        let status = outcome.status.as_u16().to_string();
        let labels = [outcome.method.as_str(), outcome.path.as_str(), status.as_str()];

        self.requests_total.inc(&labels)?;
        self.request_duration
            .observe(&labels, outcome.duration.as_secs_f64())?;

        if is_api_path(&outcome.path) {
            let result = classify(outcome.status);
            if result == "error" {
                self.error_rate.inc(&[])?;
            }
            self.api_calls.inc(&[outcome.path.as_str(), result])?;
        }
        Ok(())
    }
}

pub fn is_api_path(path: &str) -> bool {
    path.len() > API_PREFIX.len() && path.starts_with(API_PREFIX)
}

/// `"error"` for 4xx/5xx, `"success"` otherwise.
pub fn classify(status: StatusCode) -> &'static str {
    if status.as_u16() >= 400 {
        "error"
    } else {
        "success"
    }
}
