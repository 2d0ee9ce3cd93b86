//! Policy layer (per-record business rules).
//!
//! Each integration selects one `Validator` in config; the forwarder consults
//! it after normalisation and before anything is sent downstream.

pub mod validator;

pub use validator::Validator;
