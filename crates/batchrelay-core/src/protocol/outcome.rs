//! Per-record outcomes and the aggregated batch result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RecordError;

/// Reason reported for records rejected by the rule check.
pub const SKIP_CUSTOM_CHECK: &str = "customCheck_failed";

/// Result of processing one record. Always carries the record as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Success {
        record: Value,
        /// Downstream acknowledgement (`{}` when the body was not JSON).
        #[serde(rename = "mainResponse")]
        ack: Value,
    },
    Skipped { reason: String, record: Value },
    Error { error: String, record: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    Skipped,
    Error,
}

impl OutcomeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::Error => "error",
        }
    }
}

impl Outcome {
    pub fn success(record: Value, ack: Value) -> Self {
        Outcome::Success { record, ack }
    }

    /// Rule rejections become `Skipped`; every other record error is an `Error`.
    pub fn from_record_error(record: Value, err: &RecordError) -> Self {
        match err {
            RecordError::Rejected => Outcome::Skipped {
                reason: SKIP_CUSTOM_CHECK.to_owned(),
                record,
            },
            other => Outcome::Error {
                error: other.to_string(),
                record,
            },
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Success { .. } => OutcomeKind::Success,
            Outcome::Skipped { .. } => OutcomeKind::Skipped,
            Outcome::Error { .. } => OutcomeKind::Error,
        }
    }

    pub fn record(&self) -> &Value {
        match self {
            Outcome::Success { record, .. }
            | Outcome::Skipped { record, .. }
            | Outcome::Error { record, .. } => record,
        }
    }
}

/// Aggregate over one batch. `results` follows input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub total: usize,
    pub success_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
    pub results: Vec<Outcome>,
}

impl BatchResult {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            results: Vec::with_capacity(n),
            ..Self::default()
        }
    }

    /// Append an outcome and bump the matching counter.
    pub fn push(&mut self, outcome: Outcome) {
        match outcome.kind() {
            OutcomeKind::Success => self.success_count += 1,
            OutcomeKind::Skipped => self.skipped_count += 1,
            OutcomeKind::Error => self.error_count += 1,
        }
        self.total += 1;
        self.results.push(outcome);
    }
}
