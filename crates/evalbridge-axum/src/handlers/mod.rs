//! HTTP request handlers for the facade.
//!
//! Handlers are thin wrappers that delegate to `McpFacade` or
//! `WrapperProxy` held in the application context.

pub mod mcp;
pub mod passthrough;
pub mod system;
