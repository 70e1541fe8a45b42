//! `X-API-Key` authentication middleware.
//!
//! Applied as a `route_layer` to `/mcp/*` and `/wrapper/*` only, so the
//! health and discovery routes stay reachable for container probes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use evalbridge_core::AuthError;

use crate::error::HttpError;
use crate::state::AppState;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject the request unless the verifier accepts its `X-API-Key`.
///
/// Runs before any handler, so a refused request never reaches the wrapper.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = state.verifier.verify(presented) {
        match e {
            AuthError::MissingKey => tracing::warn!(
                path = %req.uri().path(),
                "API key authentication failed: no X-API-Key header provided"
            ),
            AuthError::InvalidKey => tracing::warn!(
                path = %req.uri().path(),
                "API key authentication failed: key not in authorized list"
            ),
        }
        return Err(e.into());
    }

    Ok(next.run(req).await)
}
