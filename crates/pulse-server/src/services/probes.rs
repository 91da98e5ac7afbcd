//! `/health`, `/ready` and `/version`.

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::dispatch::{Handler, RequestHead};
use crate::transport::sink::ResponseSink;

use super::{now_rfc3339, rfc3339, write_json};

pub struct HealthHandler;

#[async_trait]
impl Handler for HealthHandler {
    async fn serve(&self, _req: &RequestHead, sink: &mut dyn ResponseSink) {
        write_json(
            sink,
            StatusCode::OK,
            &json!({ "status": "healthy", "timestamp": now_rfc3339() }),
        );
    }
}

pub struct ReadyHandler;

#[async_trait]
impl Handler for ReadyHandler {
    async fn serve(&self, _req: &RequestHead, sink: &mut dyn ResponseSink) {
        write_json(
            sink,
            StatusCode::OK,
            &json!({ "status": "ready", "timestamp": now_rfc3339() }),
        );
    }
}

/// Reports the configured version and the time the process started.
pub struct VersionHandler {
    version: String,
    build_time: String,
}

impl VersionHandler {
    pub fn new(version: String, started_at: DateTime<Utc>) -> Self {
        Self {
            version,
            build_time: rfc3339(started_at),
        }
    }
}

#[async_trait]
impl Handler for VersionHandler {
    async fn serve(&self, _req: &RequestHead, sink: &mut dyn ResponseSink) {
        write_json(
            sink,
            StatusCode::OK,
            &json!({ "version": self.version, "buildTime": self.build_time }),
        );
    }
}
