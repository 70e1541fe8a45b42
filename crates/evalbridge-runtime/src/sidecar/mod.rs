//! Wrapper sidecar process management.
//!
//! When the facade is asked to launch the wrapper itself, it runs the
//! configured ASGI target under `uvicorn`, streams its output into tracing,
//! waits until `/health` answers, and stops it again on shutdown.

mod command;
mod shutdown;

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use evalbridge_core::BridgeConfig;
use reqwest::Client;
use thiserror::Error;
use tokio::process::Child;
use tokio::time::{Instant, sleep};
use tracing::{info, warn};

use crate::health::check_http_health;

pub use command::build_command;
pub use shutdown::{TERM_GRACE, shutdown_child, shutdown_child_within};

/// Interval between readiness probes.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Errors from launching or supervising the wrapper process.
#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("wrapper URL {0} has no port and no known default")]
    NoPort(String),

    #[error("failed to spawn wrapper with {python}: {source}")]
    Spawn {
        python: String,
        #[source]
        source: io::Error,
    },

    #[error("wrapper exited before becoming ready ({0})")]
    Exited(ExitStatus),

    #[error("wrapper not ready at {url} after {waited:?}")]
    NotReady { url: String, waited: Duration },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Everything needed to launch the wrapper process.
#[derive(Debug, Clone)]
pub struct SidecarConfig {
    /// Python interpreter used to run `uvicorn`.
    pub python: String,
    /// `module:attribute` of the ASGI application.
    pub asgi_target: String,
    /// `http` or `https`, as in the wrapper URL.
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Wrapper checkout to put on `PYTHONPATH` and run from.
    pub wrapper_dir: Option<PathBuf>,
    /// Accepted API keys, passed to the wrapper as `API_KEYS`.
    pub api_keys: Vec<String>,
    /// LLM provider keys to pass through explicitly.
    pub provider_env: Vec<(&'static str, String)>,
    /// How long to wait for `/health` after spawning.
    pub startup_timeout: Duration,
}

impl SidecarConfig {
    /// Derive the launch configuration from the snapshot.
    ///
    /// Host and port come from the wrapper URL so the facade and the
    /// sidecar always agree on where the wrapper lives.
    pub fn from_bridge(
        config: &BridgeConfig,
        python: impl Into<String>,
        wrapper_dir: Option<PathBuf>,
        startup_timeout: Duration,
    ) -> Result<Self, SidecarError> {
        let url = config.wrapper_url();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| SidecarError::NoPort(url.to_string()))?;

        Ok(Self {
            python: python.into(),
            asgi_target: config.effective_asgi_target(),
            scheme: url.scheme().to_string(),
            host: url.host_str().unwrap_or("127.0.0.1").to_string(),
            port,
            wrapper_dir,
            api_keys: config.api_keys().to_vec(),
            provider_env: config
                .provider_env()
                .map(|(name, value)| (name, value.to_string()))
                .collect(),
            startup_timeout,
        })
    }

    pub fn health_url(&self) -> String {
        format!("{}://{}:{}/health", self.scheme, self.host, self.port)
    }
}

/// A running wrapper process.
#[derive(Debug)]
pub struct WrapperSidecar {
    child: Child,
    health_url: String,
    startup_timeout: Duration,
}

impl WrapperSidecar {
    /// Spawn the wrapper process. Does not wait for readiness.
    pub fn spawn(config: &SidecarConfig) -> Result<Self, SidecarError> {
        let mut child = build_command(config)
            .spawn()
            .map_err(|source| SidecarError::Spawn {
                python: config.python.clone(),
                source,
            })?;
        command::spawn_log_readers(&mut child);

        info!(
            pid = ?child.id(),
            target = %config.asgi_target,
            port = config.port,
            auth_keys = config.api_keys.len(),
            "Spawned wrapper sidecar"
        );

        Ok(Self {
            child,
            health_url: config.health_url(),
            startup_timeout: config.startup_timeout,
        })
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Poll `/health` until it answers 2xx, the process exits, or the
    /// startup timeout elapses.
    pub async fn wait_ready(&mut self) -> Result<(), SidecarError> {
        let client = Client::new();
        let started = Instant::now();
        info!(url = %self.health_url, "Waiting for wrapper to become ready");

        loop {
            if let Some(status) = self.child.try_wait()? {
                warn!(%status, "Wrapper exited during startup");
                return Err(SidecarError::Exited(status));
            }

            if check_http_health(&client, &self.health_url).await {
                info!(elapsed = ?started.elapsed(), "Wrapper is ready");
                return Ok(());
            }

            if started.elapsed() >= self.startup_timeout {
                return Err(SidecarError::NotReady {
                    url: self.health_url.clone(),
                    waited: started.elapsed(),
                });
            }

            sleep(READY_POLL_INTERVAL).await;
        }
    }

    /// Stop the wrapper (SIGTERM, then SIGKILL after a grace period).
    pub async fn shutdown(self) -> io::Result<ExitStatus> {
        info!(pid = ?self.child.id(), "Stopping wrapper sidecar");
        shutdown_child(self.child).await
    }
}
