//! Shared error type across pulse crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, PulseError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum PulseError {
    /// Invalid or duplicate metric definition, or invalid service config.
    /// Always fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An instrumentation call passed the wrong number of label values.
    #[error("label mismatch for {metric}: expected {expected} label values, got {got}")]
    LabelMismatch {
        metric: String,
        expected: usize,
        got: usize,
    },

    /// The value or operation is not valid for the metric kind.
    #[error("invalid observation for {metric}: {reason}")]
    InvalidObservation { metric: String, reason: String },

    #[error("internal: {0}")]
    Internal(String),
}

impl PulseError {
    /// Stable short name, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PulseError::Configuration(_) => "CONFIGURATION",
            PulseError::LabelMismatch { .. } => "LABEL_MISMATCH",
            PulseError::InvalidObservation { .. } => "INVALID_OBSERVATION",
            PulseError::Internal(_) => "INTERNAL",
        }
    }
}
