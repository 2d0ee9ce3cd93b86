use std::collections::HashSet;

use serde::Deserialize;

use batchrelay_core::error::{RelayError, Result};
use batchrelay_core::protocol::record::{MergePolicy, RecordShape};

use crate::policy::Validator;

/// Routes owned by the ops module; integrations may not claim them.
const RESERVED_ROUTES: [&str; 3] = ["/healthz", "/readyz", "/metrics"];

const MAX_BATCH_CEILING: usize = 10_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub downstream: DownstreamConfig,

    #[serde(default)]
    pub integrations: Vec<IntegrationConfig>,
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::Validation(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.downstream.validate()?;

        if self.integrations.is_empty() {
            return Err(RelayError::Validation("integrations must not be empty".into()));
        }

        let mut ids = HashSet::new();
        let mut routes = HashSet::new();
        for i in &self.integrations {
            i.validate()?;
            if !ids.insert(i.id.as_str()) {
                return Err(RelayError::Validation(format!("duplicate integration id: {}", i.id)));
            }
            if !routes.insert(i.route.as_str()) {
                return Err(RelayError::Validation(format!(
                    "duplicate integration route: {}",
                    i.route
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upper bound on an inbound request body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if self.max_body_bytes < 1024 {
            return Err(RelayError::Validation(
                "gateway.max_body_bytes must be at least 1024".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}

/// Where validated records are forwarded.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownstreamConfig {
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_downstream_path")]
    pub path: String,

    /// Sent as `Authorization: Bearer <token>` when set.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Per-request timeout. Unset means the transport's own behaviour.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            path: default_downstream_path(),
            bearer_token: None,
            timeout_ms: None,
        }
    }
}

impl DownstreamConfig {
    pub fn validate(&self) -> Result<()> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(RelayError::Configuration(
                "downstream.base_url is not configured".into(),
            ));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(RelayError::Configuration(format!(
                "downstream.base_url must be an http(s) URL: {base}"
            )));
        }
        if !self.path.starts_with('/') {
            return Err(RelayError::Configuration(
                "downstream.path must start with '/'".into(),
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(RelayError::Configuration(
                "downstream.timeout_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Full submit URL: base (without trailing '/') + path.
    pub fn submit_url(&self) -> String {
        format!("{}{}", self.base_url.trim().trim_end_matches('/'), self.path)
    }
}

fn default_downstream_path() -> String {
    "/api/v1/your-endpoint".into()
}

/// One inbound route and the rules applied to its batches.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntegrationConfig {
    pub id: String,
    pub route: String,

    #[serde(default)]
    pub validator: Validator,

    #[serde(default)]
    pub record_shape: RecordShape,

    #[serde(default)]
    pub merge_policy: MergePolicy,

    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl IntegrationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(RelayError::Validation("integration id must not be empty".into()));
        }
        if !self.route.starts_with('/') {
            return Err(RelayError::Validation(format!(
                "integration {}: route must start with '/'",
                self.id
            )));
        }
        if RESERVED_ROUTES.contains(&self.route.as_str()) {
            return Err(RelayError::Validation(format!(
                "integration {}: route {} is reserved",
                self.id, self.route
            )));
        }
        if !(1..=MAX_BATCH_CEILING).contains(&self.max_batch_size) {
            return Err(RelayError::Validation(format!(
                "integration {}: max_batch_size must be between 1 and {MAX_BATCH_CEILING}",
                self.id
            )));
        }
        Ok(())
    }
}

fn default_max_batch_size() -> usize {
    100
}
