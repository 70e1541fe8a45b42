//! `/wrapper/*` pass-through handler.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;

use crate::error::HttpError;
use crate::state::AppState;

/// Forward any method on `/wrapper` or `/wrapper/{*path}` to the wrapper.
pub async fn forward(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, HttpError> {
    state.proxy()?.forward(method, &uri, &headers, body).await
}
