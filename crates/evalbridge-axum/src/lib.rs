//! Axum HTTP facade for the DeepEval wrapper.
//!
//! Routes:
//! - `/mcp/*`: MCP-enveloped evaluation and metric catalog (API key required)
//! - `/wrapper/*`: raw pass-through to the wrapper (API key required)
//! - `/`, `/health`, `/healthz`: discovery and liveness (open)
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Dev-dependencies used only by the integration tests
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use chrono as _;
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tower as _;
#[cfg(test)]
use uuid as _;

// Used by main.rs binary
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod cli;
pub mod error;
pub mod forward;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AppContext, ServerConfig, SidecarOptions, bootstrap, start_server};
pub use cli::Cli;
pub use error::HttpError;
pub use forward::WrapperProxy;
pub use routes::create_router;
pub use state::AppState;
