//! Command-line interface for the `evalbridge` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::bootstrap::{ServerConfig, SidecarOptions};

/// HTTP facade exposing the DeepEval wrapper through MCP-formatted routes.
#[derive(Debug, Parser)]
#[command(name = "evalbridge")]
#[command(about = "Serve DeepEval evaluations behind an MCP-formatted HTTP facade")]
#[command(version)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "EVALBRIDGE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "EVALBRIDGE_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Launch the wrapper with uvicorn and stop it on shutdown
    #[arg(long)]
    pub spawn_wrapper: bool,

    /// Python interpreter used to launch the wrapper
    #[arg(long, default_value = "python3", requires = "spawn_wrapper")]
    pub python: String,

    /// Wrapper checkout to add to PYTHONPATH and run from
    #[arg(long, requires = "spawn_wrapper")]
    pub wrapper_dir: Option<PathBuf>,

    /// Seconds to wait for the launched wrapper to answer /health
    #[arg(long, default_value_t = 60, requires = "spawn_wrapper")]
    pub wrapper_startup_timeout: u64,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            sidecar: self.spawn_wrapper.then(|| SidecarOptions {
                python: self.python.clone(),
                wrapper_dir: self.wrapper_dir.clone(),
                startup_timeout: Duration::from_secs(self.wrapper_startup_timeout),
            }),
        }
    }
}
