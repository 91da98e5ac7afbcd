//! Response sink abstraction and the status-capturing adapter.
//!
//! Handlers never build `Response`s directly. They write a status, headers
//! and body bytes into a [`ResponseSink`]; the middleware wraps the real sink
//! in a [`StatusCapture`] so it can label metrics with the status that was
//! actually committed.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::BytesMut;

/// Write side of an HTTP response.
pub trait ResponseSink: Send {
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commit the status code. Only the first call takes effect.
    fn write_status(&mut self, status: StatusCode);

    /// Append body bytes. Commits `200 OK` if no status was written yet.
    fn write_body(&mut self, chunk: &[u8]);

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(name, value);
    }
}

/// In-memory sink converted into an axum `Response` once the handler returns.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl ResponseSink for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(committed) => {
                tracing::debug!(
                    committed = committed.as_u16(),
                    ignored = status.as_u16(),
                    "superfluous write_status call"
                );
            }
        }
    }

    fn write_body(&mut self, chunk: &[u8]) {
        self.status.get_or_insert(StatusCode::OK);
        self.body.extend_from_slice(chunk);
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut res = Response::new(Body::from(self.body.freeze()));
        *res.status_mut() = status;
        *res.headers_mut() = self.headers;
        res
    }
}

/// Records the status a handler commits, delegating every call unchanged.
///
/// The recorded status defaults to `200 OK`. The first `write_status` call
/// wins; later calls are passed through but do not change the recorded value.
/// Body bytes written before any status commit the default.
#[derive(Debug)]
pub struct StatusCapture<S> {
    inner: S,
    status: StatusCode,
    committed: bool,
}

impl<S: ResponseSink> StatusCapture<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            status: StatusCode::OK,
            committed: false,
        }
    }

    /// Status as seen by the client.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ResponseSink> ResponseSink for StatusCapture<S> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        if !self.committed {
            self.status = status;
            self.committed = true;
        }
        self.inner.write_status(status);
    }

    fn write_body(&mut self, chunk: &[u8]) {
        self.committed = true;
        self.inner.write_body(chunk);
    }
}
