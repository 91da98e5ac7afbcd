use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{
    header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS},
    HeaderValue, Method, StatusCode,
};
use dashmap::DashMap;

use crate::transport::sink::ResponseSink;

/// The parts of a request handlers and metrics care about.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    path: String,
}

impl RequestHead {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Request handler. Must write a status and/or body before returning.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve(&self, req: &RequestHead, sink: &mut dyn ResponseSink);
}

/// Fixed mapping from literal path to handler. Any method is accepted.
#[derive(Default)]
pub struct Dispatcher {
    routes: DashMap<String, Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            routes: DashMap::new(),
        }
    }

    /// Register `handler` for `path`, replacing any previous registration.
    pub fn register(&self, path: &str, handler: Arc<dyn Handler>) {
        if self.routes.insert(path.to_string(), handler).is_some() {
            tracing::warn!(%path, "handler replaced");
        }
    }

    pub fn registered_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.routes.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    pub async fn dispatch(&self, req: &RequestHead, sink: &mut dyn ResponseSink) {
        // clone out so no shard lock is held across the handler's await points
        let handler = self.routes.get(req.path()).map(|e| e.value().clone());
        match handler {
            Some(handler) => handler.serve(req, sink).await,
            None => not_found(sink),
        }
    }
}

fn not_found(sink: &mut dyn ResponseSink) {
    sink.set_header(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    sink.set_header(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    sink.write_status(StatusCode::NOT_FOUND);
    sink.write_body(b"404 page not found\n");
}
