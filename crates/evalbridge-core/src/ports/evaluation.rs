//! Evaluation wrapper port.
//!
//! This port is the capability surface the façade needs from the external
//! evaluation wrapper. The production adapter talks HTTP to the wrapper
//! service; tests substitute fakes.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the wrapper or by the path to it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WrapperError {
    /// No wrapper client is available (missing provider keys or failed init).
    #[error("Wrapper client not initialised.")]
    NotInitialised,

    /// The call did not complete within the configured bound.
    #[error("Wrapper call timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure talking to the wrapper.
    #[error("Error while calling deepeval wrapper: {0}")]
    Transport(String),

    /// The wrapper answered with an error status.
    #[error("HTTP error from deepeval wrapper ({status}): {body}")]
    Status { status: u16, body: String },

    /// The wrapper answered with a body that is not JSON.
    #[error("Wrapper returned invalid JSON: {0}")]
    InvalidJson(String),

    /// The wrapper answered with JSON of an unexpected shape.
    #[error("Unexpected {0} response shape from wrapper")]
    UnexpectedShape(&'static str),
}

impl WrapperError {
    /// True when the wrapper reported that the resource does not exist.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Capability interface over the evaluation wrapper.
///
/// Payloads are opaque JSON owned by the wrapper; implementations must not
/// interpret them beyond transport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EvaluationPort: Send + Sync {
    /// Run an evaluation (`POST /evaluate/`).
    async fn evaluate(&self, payload: Value) -> Result<Value, WrapperError>;

    /// List the metric catalog (`GET /metrics/`).
    async fn list_metrics(&self) -> Result<Value, WrapperError>;

    /// Metrics grouped by category (`GET /metrics/categories`).
    async fn metric_categories(&self) -> Result<Value, WrapperError>;

    /// Details of a single metric (`GET /metrics/{metric_type}`).
    async fn metric_info(&self, metric_type: &str) -> Result<Value, WrapperError>;

    /// Liveness probe of the wrapper itself.
    async fn ping(&self) -> Result<Value, WrapperError>;
}
