//! Relay config loader (strict parsing).
//!
//! Two environment variables override the downstream section before
//! validation, so credentials can stay out of the YAML file.

pub mod schema;

use std::fs;

use batchrelay_core::error::{RelayError, Result};

pub use schema::{DownstreamConfig, GatewaySection, IntegrationConfig, RelayConfig};

pub const ENV_CONFIG_PATH: &str = "BATCHRELAY_CONFIG";
pub const ENV_BASE_URL: &str = "BATCHRELAY_DOWNSTREAM_BASE_URL";
pub const ENV_TOKEN: &str = "BATCHRELAY_DOWNSTREAM_TOKEN";

pub const DEFAULT_CONFIG_PATH: &str = "batchrelay.yaml";

pub fn load_from_file(path: &str) -> Result<RelayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| RelayError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str_with_env(&s, |k| std::env::var(k).ok())
}

/// Parse and validate without consulting the process environment.
pub fn load_from_str(s: &str) -> Result<RelayConfig> {
    load_from_str_with_env(s, |_| None)
}

/// Parse, apply overrides from `env`, then validate.
pub fn load_from_str_with_env<F>(s: &str, env: F) -> Result<RelayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg: RelayConfig = serde_yaml::from_str(s)
        .map_err(|e| RelayError::Validation(format!("invalid yaml: {e}")))?;

    if let Some(url) = env(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        cfg.downstream.base_url = url;
    }
    if let Some(token) = env(ENV_TOKEN).filter(|v| !v.is_empty()) {
        cfg.downstream.bearer_token = Some(token);
    }

    cfg.validate()?;
    Ok(cfg)
}
