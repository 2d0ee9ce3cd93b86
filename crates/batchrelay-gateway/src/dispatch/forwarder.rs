use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use tracing::Instrument;

use batchrelay_core::error::{RecordError, RelayError, Result};
use batchrelay_core::protocol::batch::Batch;
use batchrelay_core::protocol::outcome::{BatchResult, Outcome};
use batchrelay_core::protocol::record::{normalize, MergePolicy, RecordShape};

use crate::config::IntegrationConfig;
use crate::obs::RelayMetrics;
use crate::policy::Validator;
use crate::sink::DownstreamSink;

/// Forwards one integration's batches to the downstream sink.
/// Construct once at startup, then share via Arc.
pub struct BatchForwarder {
    integration: String,
    validator: Validator,
    shape: RecordShape,
    merge: MergePolicy,
    max_batch_size: usize,
    sink: Arc<dyn DownstreamSink>,
    metrics: Arc<RelayMetrics>,
}

impl BatchForwarder {
    pub fn new(
        cfg: &IntegrationConfig,
        sink: Arc<dyn DownstreamSink>,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            integration: cfg.id.clone(),
            validator: cfg.validator,
            shape: cfg.record_shape,
            merge: cfg.merge_policy,
            max_batch_size: cfg.max_batch_size,
            sink,
            metrics,
        }
    }

    pub fn integration(&self) -> &str {
        &self.integration
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Whole-batch checks. Nothing is forwarded when this fails.
    pub fn check_shape(&self, records: &[Value]) -> Result<()> {
        if records.is_empty() {
            return Err(RelayError::Validation(
                "records must be a non-empty array".into(),
            ));
        }
        if records.len() > self.max_batch_size {
            return Err(RelayError::BatchTooLarge {
                max: self.max_batch_size,
                received: records.len(),
            });
        }
        Ok(())
    }

    /// Process every record in order; each one gets exactly one outcome.
    pub async fn process_batch(
        &self,
        correlation_id: Option<&str>,
        records: Vec<Value>,
    ) -> Result<BatchResult> {
        self.check_shape(&records)?;

        let mut result = BatchResult::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let outcome = self.process_record(index, correlation_id, record).await;
            self.metrics.records.inc(&[
                ("integration", self.integration.as_str()),
                ("outcome", outcome.kind().as_str()),
            ]);
            result.push(outcome);
        }

        tracing::info!(
            total = result.total,
            success = result.success_count,
            skipped = result.skipped_count,
            error = result.error_count,
            "batch done"
        );
        Ok(result)
    }

    /// Run the batch on its own task so a dropped caller does not cancel
    /// in-flight downstream calls. A panic inside the batch is an internal fault.
    ///
    /// The batch is counted by the task itself, so a detached batch still
    /// lands in `batches_total` once it finishes.
    pub async fn process_detached(self: &Arc<Self>, batch: Batch) -> Result<BatchResult> {
        let this = Arc::clone(self);
        let span = tracing::info_span!(
            "batch",
            integration = %self.integration,
            device_id = batch.correlation_id.as_deref().unwrap_or("-"),
            records = batch.records.len(),
        );

        let joined = tokio::spawn(
            async move {
                let _in_flight = InFlight::enter(&this.metrics, &this.integration);
                match this
                    .process_batch(batch.correlation_id.as_deref(), batch.records)
                    .await
                {
                    Ok(r) => {
                        this.metrics
                            .batches
                            .inc(&[("integration", this.integration.as_str()), ("result", "done")]);
                        Ok(r)
                    }
                    Err(e) => Err(this.reject(e)),
                }
            }
            .instrument(span),
        )
        .await;

        // only a task that never returned is left to count here
        joined.unwrap_or_else(|e| {
            Err(self.reject(RelayError::Internal(format!("batch task failed: {e}"))))
        })
    }

    /// Log and count a whole-call failure, handing the error back.
    pub fn reject(&self, err: RelayError) -> RelayError {
        let label = match &err {
            RelayError::Internal(_) | RelayError::Configuration(_) => {
                tracing::error!(integration = %self.integration, error = %err, "batch failed");
                "internal"
            }
            _ => {
                tracing::warn!(integration = %self.integration, error = %err, "batch rejected");
                "rejected"
            }
        };
        self.metrics
            .batches
            .inc(&[("integration", self.integration.as_str()), ("result", label)]);
        err
    }

    async fn process_record(
        &self,
        index: usize,
        correlation_id: Option<&str>,
        record: Value,
    ) -> Outcome {
        match self.forward_one(correlation_id, &record).await {
            Ok(ack) => Outcome::success(record, ack),
            Err(e) => {
                if e == RecordError::Rejected {
                    tracing::debug!(index, "record skipped by rule check");
                } else {
                    tracing::warn!(integration = %self.integration, index, error = %e, "record failed");
                }
                Outcome::from_record_error(record, &e)
            }
        }
    }

    async fn forward_one(
        &self,
        correlation_id: Option<&str>,
        record: &Value,
    ) -> std::result::Result<Value, RecordError> {
        let payload = normalize(record, self.shape, self.merge, correlation_id)?;
        if !self.validator.check(&payload) {
            return Err(RecordError::Rejected);
        }
        let payload = Value::Object(payload);

        let started = Instant::now();
        let sent = self.sink.submit(&payload).await;
        self.metrics
            .downstream_duration
            .observe(&[("integration", self.integration.as_str())], started.elapsed());

        let resp = sent.map_err(|e| RecordError::Transport(e.to_string()))?;
        if !resp.is_success() {
            return Err(RecordError::Downstream {
                status: resp.status,
                body: resp.body,
            });
        }
        Ok(parse_ack(&resp.body))
    }
}

/// Keeps `batches_in_flight` balanced even if the batch task unwinds.
struct InFlight<'a> {
    metrics: &'a RelayMetrics,
    integration: &'a str,
}

impl<'a> InFlight<'a> {
    fn enter(metrics: &'a RelayMetrics, integration: &'a str) -> Self {
        metrics.batches_in_flight.inc(&[("integration", integration)]);
        Self { metrics, integration }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.metrics
            .batches_in_flight
            .dec(&[("integration", self.integration)]);
    }
}

/// Downstream acknowledgement; bodies that are not JSON read as `{}`.
fn parse_ack(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Map::new()))
}
