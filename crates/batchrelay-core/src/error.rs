//! Shared error types across batchrelay crates.
//!
//! Two layers:
//! - [`RelayError`] fails a whole call (bad batch shape, operator
//!   misconfiguration, internal fault).
//! - [`RecordError`] fails a single record. It is never propagated out of the
//!   batch loop; the forwarder turns it into an `Outcome`.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed batch.
    BadRequest,
    /// Batch exceeds the integration's record limit.
    BatchTooLarge,
    /// Wrong HTTP method.
    MethodNotAllowed,
    /// Missing or invalid downstream configuration.
    Configuration,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::BatchTooLarge => "BATCH_TOO_LARGE",
            ClientCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ClientCode::Configuration => "CONFIGURATION",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status the code is reported with.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::BadRequest | ClientCode::BatchTooLarge => 400,
            ClientCode::MethodNotAllowed => 405,
            ClientCode::Configuration | ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Call-level error: the whole request is rejected.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    Validation(String),
    #[error("Too many records at once. Max {max}")]
    BatchTooLarge { max: usize, received: usize },
    #[error("configuration: {0}")]
    Configuration(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl RelayError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            RelayError::Validation(_) => ClientCode::BadRequest,
            RelayError::BatchTooLarge { .. } => ClientCode::BatchTooLarge,
            RelayError::Configuration(_) => ClientCode::Configuration,
            RelayError::Internal(_) => ClientCode::Internal,
        }
    }
}

/// Per-record failure. Captured as data inside the batch result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("invalid payload encoding")]
    InvalidPayloadEncoding,
    #[error("customCheck_failed")]
    Rejected,
    #[error("downstream error {status}: {body}")]
    Downstream { status: u16, body: String },
    #[error("{0}")]
    Transport(String),
}
