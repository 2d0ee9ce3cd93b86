//! Top-level facade crate for batchrelay.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use batchrelay_core::*;
}

pub mod gateway {
    pub use batchrelay_gateway::*;
}
