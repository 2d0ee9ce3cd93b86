//! Batch protocol modules.
//!
//! - `batch`: inbound request body (`deviceId` + `records`) and shape checks.
//! - `record`: per-record normalisation (payload decoding, `deviceId` merge).
//! - `outcome`: per-record outcomes and the aggregated batch result.
//!
//! All parsers are panic-free: malformed input is reported as `RelayError`
//! (whole batch) or `RecordError` (one record), never as a panic.

pub mod batch;
pub mod outcome;
pub mod record;
