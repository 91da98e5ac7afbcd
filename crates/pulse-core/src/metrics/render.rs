//! Prometheus text exposition format (version 0.0.4).

use std::fmt::Write;

use super::family::MetricFamily;
use super::MetricKind;

/// Content type served alongside [`Registry::render`](super::Registry::render).
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Integral values print without a fraction (`3`, not `3.0`).
pub(crate) fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{v}")
    }
}

fn label_block(names: &[String], values: &[String], le: Option<&str>) -> String {
    let mut pairs: Vec<String> = names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect();
    if let Some(le) = le {
        pairs.push(format!("le=\"{le}\""));
    }
    if pairs.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", pairs.join(","))
    }
}

pub(crate) fn render_family(family: &MetricFamily, out: &mut String) {
    let def = &family.def;
    let name = def.name.as_str();
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(&def.help));
    let _ = writeln!(out, "# TYPE {} {}", name, def.kind);

    match def.kind {
        MetricKind::Counter | MetricKind::Gauge => {
            for (key, v) in family.scalar_rows() {
                let labels = label_block(&def.label_names, &key, None);
                let _ = writeln!(out, "{}{} {}", name, labels, format_value(v));
            }
        }
        MetricKind::Histogram => {
            for (key, snap) in family.histogram_rows() {
                for (le, n) in &snap.buckets {
                    let le = format_value(*le);
                    let labels = label_block(&def.label_names, &key, Some(le.as_str()));
                    let _ = writeln!(out, "{}_bucket{} {}", name, labels, n);
                }
                let labels = label_block(&def.label_names, &key, Some("+Inf"));
                let _ = writeln!(out, "{}_bucket{} {}", name, labels, snap.count);

                let labels = label_block(&def.label_names, &key, None);
                let _ = writeln!(out, "{}_sum{} {}", name, labels, format_value(snap.sum));
                let _ = writeln!(out, "{}_count{} {}", name, labels, snap.count);
            }
        }
    }
}
