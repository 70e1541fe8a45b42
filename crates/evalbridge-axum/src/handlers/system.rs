//! Health and discovery handlers. None of these require an API key.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use tracing::error;

use crate::state::AppState;

/// Service name reported by the discovery document.
pub const SERVICE_NAME: &str = "DeepEval MCP Bridge";

/// Liveness probe. Always `{"status":"ok"}`.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Liveness plus wrapper state.
///
/// Always 200; the wrapper's condition is reported in the body.
pub async fn healthz(State(state): State<AppState>) -> Json<Value> {
    let wrapper = match state.facade.as_ref() {
        None => json!({ "status": "uninitialised" }),
        Some(facade) => match facade.ping().await {
            Ok(result) => json!({ "status": "ready", "result": result }),
            Err(e) => {
                error!(error = %e, "Wrapper ping failed");
                json!({ "status": "error", "detail": e.to_string() })
            }
        },
    };

    Json(json!({ "status": "ok", "wrapper": wrapper }))
}

/// Discovery document listing the MCP and wrapper routes.
pub async fn discovery() -> Json<Value> {
    Json(discovery_document())
}

fn discovery_document() -> Value {
    json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "mcp_api": {
                "description": "Synchronous evaluation endpoints with MCP-formatted responses",
                "endpoints": {
                    "evaluate": "POST /mcp/evaluate - Run evaluation with MCP formatting",
                    "metrics_list": "GET /mcp/metrics - List all available metrics",
                    "metrics_categories": "GET /mcp/metrics/categories - Get metrics by category",
                    "metric_info": "GET /mcp/metrics/{metric_type} - Get metric details",
                },
            },
            "wrapper_api": {
                "docs": "/wrapper/docs",
                "description": "Direct access to all deepeval-wrapper functionality",
                "synchronous": {
                    "evaluate": "POST /wrapper/evaluate/ - Single evaluation",
                    "bulk": "POST /wrapper/evaluate/bulk - Bulk evaluations",
                    "metrics": "GET /wrapper/metrics/ - List metrics",
                },
                "asynchronous": {
                    "note": "These create jobs and return immediately with job IDs",
                    "evaluate_async": "POST /wrapper/evaluate/async - Async single evaluation",
                    "bulk_async": "POST /wrapper/evaluate/async/bulk - Async bulk evaluation",
                    "dataset": "POST /wrapper/evaluate/dataset - Evaluate dataset file",
                    "jobs": "GET /wrapper/jobs/ - List all jobs",
                    "job_status": "GET /wrapper/jobs/{job_id} - Get job status",
                    "job_cancel": "POST /wrapper/jobs/{job_id}/cancel - Cancel job",
                    "job_delete": "DELETE /wrapper/jobs/{job_id} - Delete job",
                },
            },
            "health": {
                "liveness": "GET /health",
                "wrapper_status": "GET /healthz",
            },
        },
        "recommendations": {
            "quick_evaluations": "Use /mcp/* endpoints for immediate results with MCP formatting",
            "batch_processing": "Use /wrapper/evaluate/async/bulk for large batches",
            "direct_access": "Use /wrapper/* for advanced features and job management",
        },
    })
}
