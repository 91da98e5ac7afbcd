//! In-process metric model.
//!
//! Counters, gauges and histograms with fixed, ordered label schemas, stored
//! in `DashMap`s of atomics and rendered in the Prometheus text exposition
//! format. Definitions are made once at startup through [`Registry`]; every
//! later update goes through a [`MetricHandle`].

mod atomic;
mod family;
mod registry;
mod render;

use std::fmt;

pub use family::{HistogramSnapshot, MetricDefinition, MetricHandle};
pub use registry::Registry;
pub use render::TEXT_CONTENT_TYPE;

/// Default histogram upper bounds in seconds.
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    /// Uses [`DEFAULT_BUCKETS`] unless defined through `Registry::define_histogram`.
    Histogram,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
