//! HTTP transport: the axum entry point and the response sink handlers write into.

pub mod http;
pub mod sink;
