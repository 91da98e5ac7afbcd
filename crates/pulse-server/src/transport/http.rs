//! axum entry point: every request lands here and goes through the metrics
//! middleware into the dispatcher.

use axum::{
    extract::State,
    http::{Method, Uri},
    response::Response,
};
use percent_encoding::percent_decode_str;

use crate::app_state::AppState;
use crate::dispatch::RequestHead;
use crate::obs::middleware;

pub async fn entry(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let path = decode_path(uri.path());
    middleware::handle(&state, RequestHead::new(method, path.into_owned())).await
}

/// Routing and the `endpoint` label use the decoded path; malformed escapes
/// are kept verbatim.
pub fn decode_path(raw: &str) -> std::borrow::Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}
