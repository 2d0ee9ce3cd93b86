//! Lightweight in-process metrics.
//!
//! Batch and record counters plus downstream latency, stored as atomics and
//! rendered by the `/metrics` handler in Prometheus text format.

pub mod metrics;

pub use metrics::RelayMetrics;
