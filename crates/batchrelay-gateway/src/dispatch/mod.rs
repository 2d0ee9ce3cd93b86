//! Batch forwarding.
//!
//! `BatchForwarder` owns one integration's rules and drives every record of a
//! batch through normalise -> check -> submit, in input order.

pub mod forwarder;

pub use forwarder::BatchForwarder;
