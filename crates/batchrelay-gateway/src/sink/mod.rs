//! Downstream sink: the one capability the forwarder needs from the main API.
//!
//! `submit` only fails on transport problems; any HTTP status, including
//! 4xx/5xx, comes back as a `SinkResponse` for the forwarder to classify.

pub mod http;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpSink;

/// Raw downstream reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkResponse {
    pub status: u16,
    pub body: String,
}

impl SinkResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("downstream request failed: {0}")]
    Transport(String),
    #[error("downstream request timed out")]
    Timeout,
}

#[async_trait]
pub trait DownstreamSink: Send + Sync {
    async fn submit(&self, payload: &Value) -> Result<SinkResponse, SinkError>;
}
