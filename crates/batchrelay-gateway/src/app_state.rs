//! Shared application state for the relay.
//!
//! Config is validated once at startup; every integration gets its own
//! `BatchForwarder`, all sharing one downstream sink and one metrics registry.

use std::collections::HashMap;
use std::sync::Arc;

use batchrelay_core::error::Result;

use crate::config::RelayConfig;
use crate::dispatch::BatchForwarder;
use crate::obs::RelayMetrics;
use crate::sink::{DownstreamSink, HttpSink};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<RelayMetrics>,
}

struct AppStateInner {
    cfg: RelayConfig,
    forwarders: HashMap<String, Arc<BatchForwarder>>,
}

impl AppState {
    /// Build application state with the reqwest-backed downstream sink.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: RelayConfig) -> Result<Self> {
        cfg.validate()?;
        let sink = HttpSink::new(&cfg.downstream)?;
        tracing::info!(url = %sink.url(), "downstream sink ready");
        Ok(Self::with_sink(cfg, Arc::new(sink)))
    }

    /// Build application state around an arbitrary sink.
    pub fn with_sink(cfg: RelayConfig, sink: Arc<dyn DownstreamSink>) -> Self {
        let metrics = Arc::new(RelayMetrics::default());

        let forwarders = cfg
            .integrations
            .iter()
            .map(|i| {
                tracing::info!(
                    integration = %i.id,
                    route = %i.route,
                    validator = i.validator.as_str(),
                    max_batch_size = i.max_batch_size,
                    "integration registered"
                );
                let fwd = BatchForwarder::new(i, Arc::clone(&sink), Arc::clone(&metrics));
                (i.id.clone(), Arc::new(fwd))
            })
            .collect();

        Self {
            inner: Arc::new(AppStateInner { cfg, forwarders }),
            metrics,
        }
    }

    pub fn cfg(&self) -> &RelayConfig {
        &self.inner.cfg
    }

    pub fn forwarder(&self, integration: &str) -> Option<Arc<BatchForwarder>> {
        self.inner.forwarders.get(integration).cloned()
    }

    pub fn metrics(&self) -> Arc<RelayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn set_draining(&self) {
        self.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }
}
