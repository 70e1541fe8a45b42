//! In-memory evaluation port that records calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use evalbridge_core::{EvaluationPort, WrapperError};
use serde_json::{Value, json};

/// How the fake answers every call.
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Serve a small fixed catalog and echo evaluation payloads.
    Healthy,
    /// Never answer within `Duration`.
    Stall(Duration),
    /// Fail every call with this error.
    Fail(WrapperError),
}

#[derive(Debug)]
pub struct FakePort {
    behaviour: Behaviour,
    calls: AtomicUsize,
    last_payload: std::sync::Mutex<Option<Value>>,
}

impl FakePort {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            last_payload: std::sync::Mutex::new(None),
        })
    }

    pub fn healthy() -> Arc<Self> {
        Self::new(Behaviour::Healthy)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<Value> {
        self.last_payload.lock().unwrap().clone()
    }

    async fn answer(&self, ok: Value) -> Result<Value, WrapperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Healthy => Ok(ok),
            Behaviour::Stall(d) => {
                tokio::time::sleep(*d).await;
                Ok(ok)
            }
            Behaviour::Fail(e) => Err(e.clone()),
        }
    }
}

pub const METRICS: [&str; 3] = ["answer_relevancy", "faithfulness", "hallucination"];

#[async_trait]
impl EvaluationPort for FakePort {
    async fn evaluate(&self, payload: Value) -> Result<Value, WrapperError> {
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        let result = json!({
            "test_case": payload["test_case"],
            "results": [{"metric": "answer_relevancy", "score": 0.75, "success": true}],
        });
        self.answer(result).await
    }

    async fn list_metrics(&self) -> Result<Value, WrapperError> {
        self.answer(json!({ "metrics": METRICS })).await
    }

    async fn metric_categories(&self) -> Result<Value, WrapperError> {
        self.answer(json!({
            "rag": ["answer_relevancy", "faithfulness"],
            "safety": ["hallucination"],
        }))
        .await
    }

    async fn metric_info(&self, metric_type: &str) -> Result<Value, WrapperError> {
        if matches!(self.behaviour, Behaviour::Healthy) && !METRICS.contains(&metric_type) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            return Err(WrapperError::Status {
                status: 404,
                body: format!("Metric type '{metric_type}' not found"),
            });
        }
        self.answer(json!({ "metric_type": metric_type, "required_params": ["input"] }))
            .await
    }

    async fn ping(&self) -> Result<Value, WrapperError> {
        self.answer(json!({ "status": "healthy" })).await
    }
}
