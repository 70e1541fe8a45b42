//! MCP result envelope and evaluation request shapes.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Constant `type` tag of every successful envelope.
pub const MCP_RESULT_TYPE: &str = "mcp.result";

/// Constant `provider` of every envelope.
pub const MCP_PROVIDER: &str = "deepeval";

/// Timestamped, identified wrapper around an opaque wrapper payload.
#[derive(Debug, Clone, Serialize)]
pub struct McpEnvelope {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(serialize_with = "serialize_micros")]
    pub timestamp: DateTime<Utc>,
    pub provider: &'static str,
    pub request_id: Uuid,
    pub data: Value,
}

impl McpEnvelope {
    /// Wrap `data` with a fresh request id and the current UTC time.
    pub fn result(data: Value) -> Self {
        Self {
            kind: MCP_RESULT_TYPE,
            timestamp: Utc::now(),
            provider: MCP_PROVIDER,
            request_id: Uuid::new_v4(),
            data,
        }
    }
}

// `2024-05-01T12:00:00.123456+00:00`
fn serialize_micros<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, false))
}

/// Rejection for evaluation bodies that are not JSON objects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestShapeError {
    #[error("evaluation request must be a JSON object")]
    NotAnObject,

    #[error("evaluation request field `data` must be a JSON object")]
    DataNotAnObject,
}

/// Inbound evaluation request.
///
/// Accepts either `{"data": {...}}` or the payload object itself; in both
/// cases [`EvaluationRequest::into_payload`] yields what the wrapper sees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct EvaluationRequest {
    data: Map<String, Value>,
}

impl EvaluationRequest {
    pub fn payload(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_payload(self) -> Value {
        Value::Object(self.data)
    }
}

impl TryFrom<Value> for EvaluationRequest {
    type Error = RequestShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut body) = value else {
            return Err(RequestShapeError::NotAnObject);
        };
        match body.remove("data") {
            Some(Value::Object(data)) => Ok(Self { data }),
            Some(_) => Err(RequestShapeError::DataNotAnObject),
            None => Ok(Self { data: body }),
        }
    }
}
