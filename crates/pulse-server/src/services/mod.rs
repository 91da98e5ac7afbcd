//! Built-in handlers.
//!
//! Static pages and probes plus the `/api/*` endpoints that exist only to
//! produce varied latency and error samples.

pub mod api;
pub mod home;
pub mod probes;

use std::sync::Arc;

use axum::http::{header::CONTENT_TYPE, HeaderValue, StatusCode};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::config::AppConfig;
use crate::dispatch::Dispatcher;
use crate::transport::sink::ResponseSink;

pub use api::{DataHandler, ErrorHandler, SlowHandler};
pub use home::HomeHandler;
pub use probes::{HealthHandler, ReadyHandler, VersionHandler};

/// Dispatcher with every built-in route registered.
pub fn builtin_dispatcher(cfg: &AppConfig, started_at: DateTime<Utc>) -> Dispatcher {
    let d = Dispatcher::new();
    d.register("/", Arc::new(HomeHandler));
    d.register("/health", Arc::new(HealthHandler));
    d.register("/ready", Arc::new(ReadyHandler));
    d.register(
        "/version",
        Arc::new(VersionHandler::new(cfg.app.version.clone(), started_at)),
    );
    d.register("/api/data", Arc::new(DataHandler));
    d.register("/api/slow", Arc::new(SlowHandler::new(cfg.demo.slow_delay())));
    d.register(
        "/api/error",
        Arc::new(ErrorHandler::new(cfg.demo.error_probability)),
    );
    d
}

/// RFC 3339, second precision, UTC.
pub(crate) fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn now_rfc3339() -> String {
    rfc3339(Utc::now())
}

/// Write `value` as a newline-terminated JSON body.
pub(crate) fn write_json(sink: &mut dyn ResponseSink, status: StatusCode, value: &Value) {
    sink.set_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    sink.write_status(status);
    let mut body = value.to_string().into_bytes();
    body.push(b'\n');
    sink.write_body(&body);
}
