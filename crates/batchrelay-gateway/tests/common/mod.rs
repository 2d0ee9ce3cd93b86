//! Shared fixtures for gateway integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use batchrelay_gateway::config::{self, RelayConfig};
use batchrelay_gateway::sink::{DownstreamSink, SinkError, SinkResponse};

pub const CONFIG: &str = r#"
version: 1
downstream:
  base_url: "http://main-api.test"
integrations:
  - id: bulk-sync
    route: /api/bulk-sync
    validator: generic
    record_shape: flat
    merge_policy: record_wins
    max_batch_size: 3
  - id: location-sync
    route: /api/location-sync
    validator: geolocation
    record_shape: row
    merge_policy: batch_wins
    max_batch_size: 200
"#;

pub fn config() -> RelayConfig {
    config::load_from_str(CONFIG).expect("fixture config must parse")
}

/// In-memory sink. Records every payload; the reply is chosen by `reply`.
pub struct RecordingSink {
    pub seen: Mutex<Vec<Value>>,
    reply: fn(&Value) -> Result<SinkResponse, SinkError>,
    delay: Option<Duration>,
}

impl RecordingSink {
    pub fn new(reply: fn(&Value) -> Result<SinkResponse, SinkError>) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            reply,
            delay: None,
        }
    }

    /// Each submit waits `delay` before it lands.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 201 with a small JSON ack, except `userId == "boom"` which gets a 500.
    pub fn scripted() -> Self {
        Self::new(|payload| {
            if payload["userId"] == "boom" {
                Ok(SinkResponse { status: 500, body: "db down".into() })
            } else {
                Ok(SinkResponse { status: 201, body: r#"{"accepted":true}"#.into() })
            }
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl DownstreamSink for RecordingSink {
    async fn submit(&self, payload: &Value) -> Result<SinkResponse, SinkError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.seen.lock().unwrap().push(payload.clone());
        (self.reply)(payload)
    }
}
