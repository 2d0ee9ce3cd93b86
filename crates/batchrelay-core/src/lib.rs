//! batchrelay core: transport-agnostic batch primitives and error types.
//!
//! This crate defines the wire-level contracts (inbound batch, record
//! normalisation, per-record outcomes) and the error surface shared by the
//! gateway and its tests. It carries no transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! Malformed records surface as `RecordError` so one bad record never takes
//! the whole batch down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{RecordError, RelayError, Result};
