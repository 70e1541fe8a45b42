//! Runtime adapters for evalbridge.
//!
//! - [`WrapperClient`]: HTTP implementation of the evaluation port.
//! - [`sidecar`]: launching and supervising the wrapper process.
#![deny(unsafe_code)]

mod client;
mod health;
pub mod sidecar;

pub use client::WrapperClient;
pub use health::check_http_health;
pub use sidecar::{SidecarConfig, SidecarError, WrapperSidecar};

