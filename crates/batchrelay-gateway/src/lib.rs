//! batchrelay gateway library entry.
//!
//! This crate wires config, the HTTP transport, per-record rule validators,
//! the batch forwarder and the downstream sink into one relay service. It is
//! intended to be consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod sink;
pub mod transport;
