//! Record normalisation.
//!
//! Turns one inbound record into the JSON object that is rule-checked and
//! forwarded downstream. Two record shapes are supported:
//! - `flat`: the record is the payload.
//! - `row`: `{ "id": .., "payload": object | "<encoded object>" }`.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::RecordError;

/// Field the batch correlation id is merged into.
pub const CORRELATION_FIELD: &str = "deviceId";

/// Shape of the records an integration receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordShape {
    #[default]
    Flat,
    Row,
}

/// Precedence between the batch `deviceId` and a record's own `deviceId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// A `deviceId` key on the record is kept, even when it is `null`.
    #[default]
    RecordWins,
    /// The batch `deviceId`, when present, overwrites the record's.
    BatchWins,
}

/// Row payload: an object, or a string holding an encoded object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RowPayload {
    Object(Map<String, Value>),
    Encoded(String),
}

impl RowPayload {
    pub fn decode(self) -> Result<Map<String, Value>, RecordError> {
        match self {
            RowPayload::Object(map) => Ok(map),
            RowPayload::Encoded(s) => {
                serde_json::from_str(&s).map_err(|_| RecordError::InvalidPayloadEncoding)
            }
        }
    }
}

/// Build the downstream payload for one record.
///
/// A flat record that is not an object contributes no fields, so the payload
/// holds only `deviceId` and is left to the rule check. For rows only the
/// decoded `payload` is forwarded; the row's own `id` is not merged into it.
pub fn normalize(
    record: &Value,
    shape: RecordShape,
    merge: MergePolicy,
    correlation_id: Option<&str>,
) -> Result<Map<String, Value>, RecordError> {
    let mut payload = match shape {
        RecordShape::Flat => record.as_object().cloned().unwrap_or_default(),
        RecordShape::Row => {
            let raw = record
                .get("payload")
                .cloned()
                .ok_or(RecordError::InvalidPayloadEncoding)?;
            let row: RowPayload =
                serde_json::from_value(raw).map_err(|_| RecordError::InvalidPayloadEncoding)?;
            row.decode()?
        }
    };

    merge_correlation(&mut payload, correlation_id, merge);
    Ok(payload)
}

/// Write `deviceId` into `payload` per `policy`. Absent on both sides yields `null`.
pub fn merge_correlation(
    payload: &mut Map<String, Value>,
    correlation_id: Option<&str>,
    policy: MergePolicy,
) {
    let batch = correlation_id.map(|s| Value::String(s.to_owned()));
    let own = payload.get(CORRELATION_FIELD).cloned();

    let merged = match policy {
        MergePolicy::RecordWins => own.or(batch),
        // an explicit null on the record does not block the batch value
        MergePolicy::BatchWins => batch.or_else(|| own.filter(|v| !v.is_null())),
    };
    payload.insert(CORRELATION_FIELD.to_owned(), merged.unwrap_or(Value::Null));
}
