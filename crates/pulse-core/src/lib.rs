//! pulse core: error surface and the in-process metric model.
//!
//! This crate owns metric definitions, labeled sample storage and the text
//! exposition renderer used by the HTTP service. It carries no transport or
//! runtime dependencies so the model can be exercised directly from tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Misuse of the model (duplicate names, wrong label arity, negative counter
//! deltas) surfaces as `PulseError` instead of crashing the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{PulseError, Result};
