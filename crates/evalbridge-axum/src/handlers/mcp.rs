//! MCP handlers - enveloped evaluation and metric catalog routes.
//!
//! Every successful response carries the envelope's request id in the
//! `X-Request-ID` header as well as in the body.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use evalbridge_core::{EvaluationRequest, McpEnvelope};

use crate::error::HttpError;
use crate::state::AppState;

/// Response header echoing the envelope's request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn enveloped(envelope: McpEnvelope) -> Response {
    let request_id = envelope.request_id.to_string();
    let mut response = Json(envelope).into_response();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Run an evaluation through the wrapper.
pub async fn evaluate(
    State(state): State<AppState>,
    body: Result<Json<EvaluationRequest>, JsonRejection>,
) -> Result<Response, HttpError> {
    let facade = state.facade()?;
    let Json(request) = body?;
    Ok(enveloped(facade.evaluate(request).await?))
}

/// List all available metrics.
pub async fn list_metrics(State(state): State<AppState>) -> Result<Response, HttpError> {
    Ok(enveloped(state.facade()?.list_metrics().await?))
}

/// Metrics grouped by category.
pub async fn metric_categories(State(state): State<AppState>) -> Result<Response, HttpError> {
    Ok(enveloped(state.facade()?.metric_categories().await?))
}

/// Details of a single metric. An unknown metric is a 404.
pub async fn metric_info(
    State(state): State<AppState>,
    Path(metric_type): Path<String>,
) -> Result<Response, HttpError> {
    let envelope = state
        .facade()?
        .metric_info(&metric_type)
        .await
        .map_err(HttpError::from_metric_lookup)?;
    Ok(enveloped(envelope))
}
