//! MCP façade over the evaluation port.
//!
//! Every call is a single attempt bounded by the configured timeout. Results
//! come back wrapped in an [`McpEnvelope`]; failures come back as
//! [`WrapperError`] and are never retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::envelope::{EvaluationRequest, McpEnvelope};
use crate::ports::{EvaluationPort, WrapperError};

/// Translates inbound requests into wrapper calls and envelopes the results.
#[derive(Clone)]
pub struct McpFacade {
    port: Arc<dyn EvaluationPort>,
    timeout: Duration,
}

impl McpFacade {
    pub fn new(port: Arc<dyn EvaluationPort>, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run an evaluation and envelope the wrapper's result.
    pub async fn evaluate(&self, request: EvaluationRequest) -> Result<McpEnvelope, WrapperError> {
        info!(
            payload_keys = ?request.payload().keys().collect::<Vec<_>>(),
            "Received evaluation request"
        );
        let result = self
            .bounded("evaluate", self.port.evaluate(request.into_payload()))
            .await?;
        require_object(&result, "evaluate")?;
        info!("Wrapper evaluate completed");
        Ok(McpEnvelope::result(result))
    }

    /// List all metrics known to the wrapper.
    pub async fn list_metrics(&self) -> Result<McpEnvelope, WrapperError> {
        let result = self.bounded("list_metrics", self.port.list_metrics()).await?;
        require_object(&result, "metrics")?;
        Ok(McpEnvelope::result(result))
    }

    /// Metrics grouped by category.
    pub async fn metric_categories(&self) -> Result<McpEnvelope, WrapperError> {
        let result = self
            .bounded("metric_categories", self.port.metric_categories())
            .await?;
        Ok(McpEnvelope::result(result))
    }

    /// Details of a single metric.
    pub async fn metric_info(&self, metric_type: &str) -> Result<McpEnvelope, WrapperError> {
        let result = self
            .bounded("metric_info", self.port.metric_info(metric_type))
            .await?;
        Ok(McpEnvelope::result(result))
    }

    /// Probe the wrapper, bounded like every other call.
    pub async fn ping(&self) -> Result<Value, WrapperError> {
        self.bounded("ping", self.port.ping()).await
    }

    async fn bounded<F>(&self, operation: &'static str, call: F) -> Result<Value, WrapperError>
    where
        F: Future<Output = Result<Value, WrapperError>>,
    {
        debug!(operation, timeout = ?self.timeout, "Calling wrapper");
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(operation, error = %e, "Wrapper call failed");
                Err(e)
            }
            Err(_) => {
                error!(operation, timeout = ?self.timeout, "Wrapper call timed out");
                Err(WrapperError::Timeout(self.timeout))
            }
        }
    }
}

fn require_object(value: &Value, what: &'static str) -> Result<(), WrapperError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(WrapperError::UnexpectedShape(what))
    }
}
