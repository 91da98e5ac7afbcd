//! pulse server library entry.
//!
//! Wires config, the metric registry, the metrics middleware, the dispatcher
//! and the built-in handlers into an axum service. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod router;
pub mod services;
pub mod shutdown;
pub mod transport;
