//! Synthetic API endpoints: steady, slow and flaky.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use rand::Rng;
use serde_json::json;

use crate::dispatch::{Handler, RequestHead};
use crate::transport::sink::ResponseSink;

use super::{now_rfc3339, write_json};

/// Upper bound (exclusive) of the `random` field.
pub const RANDOM_RANGE: u32 = 1000;

/// `/api/data`: always 200 with a random number in `0..1000`.
pub struct DataHandler;

#[async_trait]
impl Handler for DataHandler {
    async fn serve(&self, _req: &RequestHead, sink: &mut dyn ResponseSink) {
        let random = rand::thread_rng().gen_range(0..RANDOM_RANGE);
        write_json(
            sink,
            StatusCode::OK,
            &json!({
                "message": "Hello from pulse!",
                "timestamp": now_rfc3339(),
                "random": random,
                "status": "success",
            }),
        );
    }
}

/// `/api/slow`: sleeps for a fixed delay, then answers 200.
pub struct SlowHandler {
    delay: Duration,
}

impl SlowHandler {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Handler for SlowHandler {
    async fn serve(&self, _req: &RequestHead, sink: &mut dyn ResponseSink) {
        tokio::time::sleep(self.delay).await;
        write_json(
            sink,
            StatusCode::OK,
            &json!({
                "message": "This was a slow endpoint",
                "timestamp": now_rfc3339(),
                "delay": format_delay(self.delay),
            }),
        );
    }
}

/// `/api/error`: 500 with the configured probability, 200 otherwise.
pub struct ErrorHandler {
    probability: f64,
}

impl ErrorHandler {
    pub fn new(probability: f64) -> Self {
        Self { probability }
    }

    fn roll(&self) -> bool {
        rand::thread_rng().gen::<f64>() < self.probability
    }
}

#[async_trait]
impl Handler for ErrorHandler {
    async fn serve(&self, _req: &RequestHead, sink: &mut dyn ResponseSink) {
        if self.roll() {
            write_json(
                sink,
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "error": "Internal server error", "timestamp": now_rfc3339() }),
            );
            return;
        }
        write_json(
            sink,
            StatusCode::OK,
            &json!({
                "message": "Success despite error endpoint",
                "timestamp": now_rfc3339(),
                "lucky": true,
            }),
        );
    }
}

/// `2s` for whole seconds, `250ms` otherwise.
fn format_delay(d: Duration) -> String {
    let ms = d.as_millis();
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{ms}ms")
    }
}
