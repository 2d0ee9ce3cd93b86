//! Inbound batch body.
//!
//! The body is parsed leniently (unknown top-level fields are ignored) and
//! `records` is kept as a raw `Value` so a missing or non-array field can be
//! reported as a shape violation instead of a generic decode error.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{RelayError, Result};

/// Raw request body as sent by callers.
#[derive(Debug, Default, Deserialize)]
pub struct BatchRequest {
    /// Correlation id attached to every forwarded record. Kept raw so a
    /// non-string value gets its own error message.
    #[serde(rename = "deviceId", default)]
    pub device_id: Option<Value>,
    #[serde(default)]
    pub records: Option<Value>,
}

/// Shape-checked batch: non-empty, ordered records.
#[derive(Debug, Clone)]
pub struct Batch {
    pub correlation_id: Option<String>,
    pub records: Vec<Value>,
}

impl BatchRequest {
    /// Decode a request body. An empty body is treated as `{}`.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| RelayError::Validation(format!("invalid JSON body: {e}")))
    }

    /// Check that `records` is a non-empty array and `deviceId` a string or null.
    pub fn into_batch(self) -> Result<Batch> {
        let correlation_id = match self.device_id {
            None | Some(Value::Null) => None,
            Some(Value::String(d)) => Some(d).filter(|d| !d.is_empty()),
            Some(_) => {
                return Err(RelayError::Validation(
                    "deviceId must be a string or null".into(),
                ))
            }
        };

        let records = match self.records {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => {
                return Err(RelayError::Validation(
                    "records must be a non-empty array".into(),
                ))
            }
        };

        Ok(Batch {
            correlation_id,
            records,
        })
    }
}
