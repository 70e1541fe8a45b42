//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no transport details and use only domain types.

pub mod evaluation;

pub use evaluation::{EvaluationPort, WrapperError};
#[cfg(test)]
pub use evaluation::MockEvaluationPort;
