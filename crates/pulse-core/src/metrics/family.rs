//! Metric families and their labeled samples.
//!
//! A family is one definition plus every label-value tuple observed for it.
//! Samples are created lazily on first observation and live as long as the
//! family. Each sample is a set of atomics, so concurrent updates to the same
//! tuple never take more than the shard lock of the family's `DashMap`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{PulseError, Result};

use super::atomic::AtomicF64;
use super::MetricKind;

/// Label values in definition order.
pub(crate) type LabelKey = Vec<String>;

/// Immutable description of a metric, fixed at definition time.
#[derive(Debug, Clone)]
pub struct MetricDefinition {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) kind: MetricKind,
    pub(crate) label_names: Vec<String>,
    pub(crate) buckets: Vec<f64>,
}

impl MetricDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Histogram upper bounds (empty for counters and gauges).
    pub fn buckets(&self) -> &[f64] {
        &self.buckets
    }
}

#[derive(Debug)]
pub(crate) struct HistogramCell {
    count: AtomicU64,
    sum: AtomicF64,
    // cumulative, one per configured upper bound; +Inf is `count`
    buckets: Vec<AtomicU64>,
}

impl HistogramCell {
    fn new(bounds: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicF64::default(),
            buckets: (0..bounds).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    // Writers publish count, then buckets from the widest bound down; readers
    // load buckets from the narrowest bound up and count last. Any bucket value
    // a reader sees is then bounded by every wider bucket and by count.
    fn observe(&self, bounds: &[f64], v: f64) {
        self.count.fetch_add(1, Ordering::Release);
        self.sum.add(v);
        for (i, &le) in bounds.iter().enumerate().rev() {
            if v > le {
                break;
            }
            self.buckets[i].fetch_add(1, Ordering::Release);
        }
    }

    fn snapshot(&self, bounds: &[f64]) -> HistogramSnapshot {
        let buckets = bounds
            .iter()
            .zip(&self.buckets)
            .map(|(&le, n)| (le, n.load(Ordering::Acquire)))
            .collect();
        let sum = self.sum.get();
        HistogramSnapshot {
            count: self.count.load(Ordering::Acquire),
            sum,
            buckets,
        }
    }
}

/// Point-in-time copy of one histogram sample.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub sum: f64,
    /// `(upper_bound, cumulative_count)` pairs, ascending, without `+Inf`.
    pub buckets: Vec<(f64, u64)>,
}

#[derive(Debug)]
pub(crate) enum Samples {
    /// Counters and gauges.
    Scalar(DashMap<LabelKey, AtomicF64>),
    Histogram(DashMap<LabelKey, HistogramCell>),
}

#[derive(Debug)]
pub(crate) struct MetricFamily {
    pub(crate) seq: usize,
    pub(crate) def: MetricDefinition,
    pub(crate) samples: Samples,
}

impl MetricFamily {
    pub(crate) fn new(seq: usize, def: MetricDefinition) -> Self {
        let samples = match def.kind {
            MetricKind::Counter | MetricKind::Gauge => Samples::Scalar(DashMap::new()),
            MetricKind::Histogram => Samples::Histogram(DashMap::new()),
        };
        let family = Self { seq, def, samples };

        // label-less metrics expose their single sample from the start
        if family.def.label_names.is_empty() {
            match &family.samples {
                Samples::Scalar(map) => {
                    map.insert(Vec::new(), AtomicF64::default());
                }
                Samples::Histogram(map) => {
                    map.insert(Vec::new(), HistogramCell::new(family.def.buckets.len()));
                }
            }
        }
        family
    }

    /// Scalar rows sorted by label values.
    pub(crate) fn scalar_rows(&self) -> Vec<(LabelKey, f64)> {
        let mut rows: Vec<(LabelKey, f64)> = match &self.samples {
            Samples::Scalar(map) => map
                .iter()
                .map(|r| (r.key().clone(), r.value().get()))
                .collect(),
            Samples::Histogram(_) => Vec::new(),
        };
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    /// Histogram rows sorted by label values.
    pub(crate) fn histogram_rows(&self) -> Vec<(LabelKey, HistogramSnapshot)> {
        let mut rows: Vec<(LabelKey, HistogramSnapshot)> = match &self.samples {
            Samples::Histogram(map) => map
                .iter()
                .map(|r| (r.key().clone(), r.value().snapshot(&self.def.buckets)))
                .collect(),
            Samples::Scalar(_) => Vec::new(),
        };
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }
}

/// Cheap, cloneable reference to a defined metric.
///
/// Handles are returned by [`Registry::define`](super::Registry::define) and
/// are the only way to record values.
#[derive(Debug, Clone)]
pub struct MetricHandle {
    family: Arc<MetricFamily>,
}

impl MetricHandle {
    pub(crate) fn new(family: Arc<MetricFamily>) -> Self {
        Self { family }
    }

    pub(crate) fn family(&self) -> &MetricFamily {
        &self.family
    }

    pub fn definition(&self) -> &MetricDefinition {
        &self.family.def
    }

    pub fn name(&self) -> &str {
        &self.family.def.name
    }

    pub fn kind(&self) -> MetricKind {
        self.family.def.kind
    }

    /// Record `value` for the given label tuple.
    ///
    /// - counter: adds `value`, which must be finite and non-negative
    /// - gauge: sets the absolute value
    /// - histogram: counts `value` into every bucket whose bound is >= `value`
    pub fn observe(&self, labels: &[&str], value: f64) -> Result<()> {
        match self.kind() {
            MetricKind::Counter => {
                if !value.is_finite() || value < 0.0 {
                    return Err(self.invalid(format!(
                        "counter delta must be finite and non-negative, got {value}"
                    )));
                }
                self.with_scalar(labels, |v| v.add(value))
            }
            MetricKind::Gauge => self.with_scalar(labels, |v| v.set(value)),
            MetricKind::Histogram => {
                if value.is_nan() {
                    return Err(self.invalid("histogram observation must not be NaN".into()));
                }
                self.with_histogram(labels, |cell, bounds| cell.observe(bounds, value))
            }
        }
    }

    /// Add 1 to a counter or gauge.
    pub fn inc(&self, labels: &[&str]) -> Result<()> {
        match self.kind() {
            MetricKind::Counter | MetricKind::Gauge => self.with_scalar(labels, |v| v.add(1.0)),
            MetricKind::Histogram => Err(self.invalid("inc is not defined for histograms".into())),
        }
    }

    /// Subtract 1 from a gauge.
    pub fn dec(&self, labels: &[&str]) -> Result<()> {
        match self.kind() {
            MetricKind::Gauge => self.with_scalar(labels, |v| v.add(-1.0)),
            kind => Err(self.invalid(format!("dec is not defined for {kind}s"))),
        }
    }

    /// Set a gauge to an absolute value.
    pub fn set(&self, labels: &[&str], value: f64) -> Result<()> {
        match self.kind() {
            MetricKind::Gauge => self.with_scalar(labels, |v| v.set(value)),
            kind => Err(self.invalid(format!("set is not defined for {kind}s"))),
        }
    }

    /// Current counter or gauge value, `None` if the tuple was never observed.
    pub fn value(&self, labels: &[&str]) -> Option<f64> {
        match &self.family.samples {
            Samples::Scalar(map) => map.get(&owned(labels)).map(|v| v.get()),
            Samples::Histogram(_) => None,
        }
    }

    /// Current histogram state, `None` if the tuple was never observed.
    pub fn histogram(&self, labels: &[&str]) -> Option<HistogramSnapshot> {
        match &self.family.samples {
            Samples::Histogram(map) => map
                .get(&owned(labels))
                .map(|cell| cell.snapshot(&self.family.def.buckets)),
            Samples::Scalar(_) => None,
        }
    }

    fn key(&self, labels: &[&str]) -> Result<LabelKey> {
        let expected = self.family.def.label_names.len();
        if labels.len() != expected {
            return Err(PulseError::LabelMismatch {
                metric: self.family.def.name.clone(),
                expected,
                got: labels.len(),
            });
        }
        Ok(owned(labels))
    }

    fn with_scalar(&self, labels: &[&str], f: impl FnOnce(&AtomicF64)) -> Result<()> {
        let key = self.key(labels)?;
        let Samples::Scalar(map) = &self.family.samples else {
            return Err(PulseError::Internal(format!(
                "{} has no scalar samples",
                self.family.def.name
            )));
        };
        if let Some(v) = map.get(&key) {
            f(v.value());
            return Ok(());
        }
        let v = map.entry(key).or_default();
        f(v.value());
        Ok(())
    }

    fn with_histogram(
        &self,
        labels: &[&str],
        f: impl FnOnce(&HistogramCell, &[f64]),
    ) -> Result<()> {
        let key = self.key(labels)?;
        let bounds = self.family.def.buckets.as_slice();
        let Samples::Histogram(map) = &self.family.samples else {
            return Err(PulseError::Internal(format!(
                "{} has no histogram samples",
                self.family.def.name
            )));
        };
        if let Some(cell) = map.get(&key) {
            f(cell.value(), bounds);
            return Ok(());
        }
        let cell = map.entry(key).or_insert_with(|| HistogramCell::new(bounds.len()));
        f(cell.value(), bounds);
        Ok(())
    }

    fn invalid(&self, reason: String) -> PulseError {
        PulseError::InvalidObservation {
            metric: self.family.def.name.clone(),
            reason,
        }
    }
}

fn owned(labels: &[&str]) -> LabelKey {
    labels.iter().map(|s| s.to_string()).collect()
}
