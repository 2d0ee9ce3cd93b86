//! Transport layer (HTTP).
//!
//! Exposes the batch handler and the JSON error mapping for call-level
//! failures.

pub mod http;

pub use http::{ApiError, BatchResponse};
