//! Request instrumentation.
//!
//! `metrics` defines the HTTP metric set on top of the core registry;
//! `middleware` measures every dispatched request and serves the scrape
//! endpoint.

pub mod metrics;
pub mod middleware;
