use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use batchrelay_core::error::{RelayError, Result};

use super::{DownstreamSink, SinkError, SinkResponse};
use crate::config::DownstreamConfig;

/// POSTs each record as JSON to `base_url + path`.
#[derive(Clone)]
pub struct HttpSink {
    url: String,
    bearer_token: Option<String>,
    client: Client,
}

impl HttpSink {
    pub fn new(cfg: &DownstreamConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(ms) = cfg.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| RelayError::Configuration(format!("http client build failed: {e}")))?;

        Ok(Self::with_client(cfg, client))
    }

    /// Reuse an existing client (shared pool, tests).
    pub fn with_client(cfg: &DownstreamConfig, client: Client) -> Self {
        Self {
            url: cfg.submit_url(),
            bearer_token: cfg.bearer_token.clone().filter(|t| !t.is_empty()),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DownstreamSink for HttpSink {
    async fn submit(&self, payload: &Value) -> std::result::Result<SinkResponse, SinkError> {
        let mut request = self.client.post(&self.url).json(payload);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SinkError::Timeout
            } else {
                SinkError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let mut body = response.text().await.unwrap_or_default();
        if body.is_empty() && !status.is_success() {
            body = status.canonical_reason().unwrap_or_default().to_owned();
        }

        Ok(SinkResponse {
            status: status.as_u16(),
            body,
        })
    }
}
