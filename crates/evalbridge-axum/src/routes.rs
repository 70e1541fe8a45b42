//! Route definitions and router construction.
//!
//! `/mcp/*` and `/wrapper/*` sit behind the API key middleware; the health
//! and discovery routes do not.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{any, get, post};
use tower_http::trace::TraceLayer;

use crate::bootstrap::AppContext;
use crate::handlers::{mcp, passthrough, system};
use crate::middleware::require_api_key;
use crate::state::AppState;

/// MCP-enveloped routes.
fn mcp_routes() -> Router<AppState> {
    Router::new()
        .route("/mcp/evaluate", post(mcp::evaluate))
        .route("/mcp/metrics", get(mcp::list_metrics))
        .route("/mcp/metrics/categories", get(mcp::metric_categories))
        .route("/mcp/metrics/{metric_type}", get(mcp::metric_info))
}

/// Raw pass-through to the wrapper, any method.
fn wrapper_routes() -> Router<AppState> {
    Router::new()
        .route("/wrapper", any(passthrough::forward))
        .route("/wrapper/{*path}", any(passthrough::forward))
}

/// Build the complete router.
pub fn create_router(ctx: AppContext) -> Router {
    let state: AppState = Arc::new(ctx);
    let auth = middleware::from_fn_with_state(Arc::clone(&state), require_api_key);

    let protected = mcp_routes().merge(wrapper_routes()).route_layer(auth);

    Router::new()
        .route("/", get(system::discovery))
        .route("/health", get(system::health))
        .route("/healthz", get(system::healthz))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
