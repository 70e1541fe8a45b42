//! Shared application state type.
//!
//! Defines the `AppState` type used across all handlers and middleware.

use crate::bootstrap::AppContext;
use std::sync::Arc;

/// Application state shared across all handlers.
///
/// This is an Arc-wrapped `AppContext`: the configuration snapshot, the
/// credential verifier and, when available, the wrapper facade and proxy.
pub type AppState = Arc<AppContext>;
