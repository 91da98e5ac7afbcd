//! `/`: static landing page listing the endpoints.

use async_trait::async_trait;
use axum::http::{header::CONTENT_TYPE, HeaderValue, StatusCode};

use crate::dispatch::{Handler, RequestHead};
use crate::transport::sink::ResponseSink;

const HOME_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
	<title>pulse</title>
	<style>
		body { font-family: Arial, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
		h1 { color: #326ce5; }
		.endpoint { background: #f5f5f5; padding: 10px; margin: 10px 0; border-left: 3px solid #326ce5; }
		code { background: #e0e0e0; padding: 2px 6px; border-radius: 3px; }
	</style>
</head>
<body>
	<h1>pulse - progressive delivery demo</h1>
	<p>Synthetic traffic source instrumented with Prometheus metrics.</p>

	<h2>Available Endpoints:</h2>
	<div class="endpoint"><code>GET /</code> - This page</div>
	<div class="endpoint"><code>GET /health</code> - Health check</div>
	<div class="endpoint"><code>GET /ready</code> - Readiness probe</div>
	<div class="endpoint"><code>GET /version</code> - Application version</div>
	<div class="endpoint"><code>GET /api/data</code> - Sample API endpoint</div>
	<div class="endpoint"><code>GET /api/slow</code> - Slow endpoint (fixed delay)</div>
	<div class="endpoint"><code>GET /api/error</code> - Error endpoint (random failures)</div>
	<div class="endpoint"><code>GET /metrics</code> - Prometheus metrics</div>

	<h2>Observability:</h2>
	<ul>
		<li>Prometheus metrics exported on /metrics</li>
		<li>Request count, duration, and in-flight requests tracked</li>
		<li>API calls classified as success or error for canary analysis</li>
	</ul>
</body>
</html>
"#;

pub struct HomeHandler;

#[async_trait]
impl Handler for HomeHandler {
    async fn serve(&self, _req: &RequestHead, sink: &mut dyn ResponseSink) {
        sink.set_header(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        sink.write_status(StatusCode::OK);
        sink.write_body(HOME_HTML.as_bytes());
    }
}
