//! Metric registry: definition, lookup and rendering.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{PulseError, Result};

use super::family::{MetricDefinition, MetricFamily, MetricHandle};
use super::render::render_family;
use super::{MetricKind, DEFAULT_BUCKETS};

/// Process-wide set of named metrics.
///
/// Build one at startup, define every metric, then share it (usually behind
/// the application state). All recording is lock-free per sample; only
/// `define` and `render` touch more than one family.
#[derive(Debug, Default)]
pub struct Registry {
    families: DashMap<String, MetricHandle>,
    next_seq: AtomicUsize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a metric. Histograms get [`DEFAULT_BUCKETS`].
    ///
    /// Fails with `Configuration` if `name` is already registered or if the
    /// name or label names are not valid exposition identifiers.
    pub fn define(
        &self,
        name: &str,
        help: &str,
        kind: MetricKind,
        label_names: &[&str],
    ) -> Result<MetricHandle> {
        let buckets = match kind {
            MetricKind::Histogram => DEFAULT_BUCKETS.to_vec(),
            MetricKind::Counter | MetricKind::Gauge => Vec::new(),
        };
        self.insert(name, help, kind, label_names, buckets)
    }

    /// Define a histogram with explicit upper bounds.
    pub fn define_histogram(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
        buckets: &[f64],
    ) -> Result<MetricHandle> {
        if buckets.is_empty() {
            return Err(PulseError::Configuration(format!("{name}: buckets must not be empty")));
        }
        if buckets.iter().any(|b| !b.is_finite()) {
            return Err(PulseError::Configuration(format!("{name}: buckets must be finite")));
        }
        if buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PulseError::Configuration(format!(
                "{name}: buckets must be strictly increasing"
            )));
        }
        self.insert(name, help, MetricKind::Histogram, label_names, buckets.to_vec())
    }

    /// Look up a previously defined metric.
    pub fn get(&self, name: &str) -> Option<MetricHandle> {
        self.families.get(name).map(|h| h.value().clone())
    }

    /// Record through a handle. Same as [`MetricHandle::observe`].
    pub fn observe(&self, handle: &MetricHandle, labels: &[&str], value: f64) -> Result<()> {
        handle.observe(labels, value)
    }

    /// Number of defined metrics.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Render every family, in definition order, in text exposition format.
    pub fn render(&self) -> String {
        let mut handles: Vec<MetricHandle> =
            self.families.iter().map(|h| h.value().clone()).collect();
        handles.sort_by_key(|h| h.family().seq);

        let mut out = String::new();
        for h in &handles {
            render_family(h.family(), &mut out);
        }
        out
    }

    fn insert(
        &self,
        name: &str,
        help: &str,
        kind: MetricKind,
        label_names: &[&str],
        buckets: Vec<f64>,
    ) -> Result<MetricHandle> {
        validate_schema(name, kind, label_names)?;

        match self.families.entry(name.to_string()) {
            Entry::Occupied(_) => Err(PulseError::Configuration(format!(
                "metric already registered: {name}"
            ))),
            Entry::Vacant(slot) => {
                let def = MetricDefinition {
                    name: name.to_string(),
                    help: help.to_string(),
                    kind,
                    label_names: label_names.iter().map(|s| s.to_string()).collect(),
                    buckets,
                };
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                let handle = MetricHandle::new(Arc::new(MetricFamily::new(seq, def)));
                slot.insert(handle.clone());
                tracing::debug!(metric = %name, kind = %kind, "metric defined");
                Ok(handle)
            }
        }
    }
}

fn validate_schema(name: &str, kind: MetricKind, label_names: &[&str]) -> Result<()> {
    if !is_metric_name(name) {
        return Err(PulseError::Configuration(format!("invalid metric name: {name:?}")));
    }
    for (i, label) in label_names.iter().enumerate() {
        if !is_label_name(label) {
            return Err(PulseError::Configuration(format!(
                "{name}: invalid label name {label:?}"
            )));
        }
        if label_names[..i].contains(label) {
            return Err(PulseError::Configuration(format!(
                "{name}: duplicate label name {label:?}"
            )));
        }
        if kind == MetricKind::Histogram && *label == "le" {
            return Err(PulseError::Configuration(format!(
                "{name}: label \"le\" is reserved for histograms"
            )));
        }
    }
    Ok(())
}

// [a-zA-Z_:][a-zA-Z0-9_:]*
fn is_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

// [a-zA-Z_][a-zA-Z0-9_]*, "__" prefix reserved
fn is_label_name(s: &str) -> bool {
    if s.starts_with("__") {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
