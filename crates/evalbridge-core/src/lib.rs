//! Core domain types and port definitions for evalbridge.
//!
//! This crate knows nothing about HTTP servers or process management. It owns
//! the configuration snapshot, the MCP envelope, the credential verification
//! strategy and the port through which the façade reaches the evaluation
//! wrapper.
#![deny(unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod envelope;
pub mod ports;
pub mod services;

// Re-export commonly used types for convenience
pub use auth::{ApiKeySet, AuthError, CredentialVerifier};
pub use config::{
    BridgeConfig, ConfigError, ConfigWarning, DEFAULT_TIMEOUT_SECS, DEFAULT_WRAPPER_IMPORT_PATH,
    DEFAULT_WRAPPER_URL, LlmProvider, WRAPPER_MOUNT_PATH,
};
pub use envelope::{
    EvaluationRequest, MCP_PROVIDER, MCP_RESULT_TYPE, McpEnvelope, RequestShapeError,
};
pub use ports::{EvaluationPort, WrapperError};
pub use services::McpFacade;

#[cfg(test)]
use tokio_test as _;
