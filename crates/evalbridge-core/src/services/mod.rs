//! Domain services built on top of the ports.

pub mod facade;

pub use facade::McpFacade;
