//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the facade. The wrapper client, the credential verifier and the
//! optional wrapper sidecar are all instantiated here.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use evalbridge_core::{
    ApiKeySet, BridgeConfig, ConfigWarning, CredentialVerifier, EvaluationPort, McpFacade,
    WrapperError,
};
use evalbridge_runtime::{SidecarConfig, WrapperClient, WrapperSidecar};
use reqwest::Client;
use reqwest::redirect::Policy;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::HttpError;
use crate::forward::WrapperProxy;
use crate::routes::create_router;

/// Connect timeout for pass-through requests.
const PROXY_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How to launch the wrapper when the facade owns its lifecycle.
#[derive(Debug, Clone)]
pub struct SidecarOptions {
    pub python: String,
    pub wrapper_dir: Option<PathBuf>,
    pub startup_timeout: Duration,
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Launch and supervise the wrapper instead of expecting one to run.
    pub sidecar: Option<SidecarOptions>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            sidecar: None,
        }
    }
}

/// Application context for the Axum adapter.
///
/// `facade` and `proxy` are absent when the wrapper could not be
/// initialised; the routes that need them answer 503 in that case.
pub struct AppContext {
    pub config: Arc<BridgeConfig>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub facade: Option<McpFacade>,
    pub proxy: Option<WrapperProxy>,
}

impl AppContext {
    /// Assemble a context around an existing evaluation port.
    ///
    /// `port = None` models an uninitialised wrapper. Pass-through always
    /// targets `config.wrapper_url()`.
    pub fn new(config: Arc<BridgeConfig>, port: Option<Arc<dyn EvaluationPort>>) -> Result<Self> {
        let verifier: Arc<dyn CredentialVerifier> = Arc::new(ApiKeySet::new(config.api_keys()));

        let (facade, proxy) = match port {
            Some(port) => {
                // Redirects belong to the caller, not the facade
                let client = Client::builder()
                    .connect_timeout(PROXY_CONNECT_TIMEOUT)
                    .redirect(Policy::none())
                    .build()
                    .context("failed to build pass-through HTTP client")?;
                (
                    Some(McpFacade::new(port, config.timeout())),
                    Some(WrapperProxy::new(client, config.wrapper_url().as_str())),
                )
            }
            None => (None, None),
        };

        Ok(Self {
            config,
            verifier,
            facade,
            proxy,
        })
    }

    pub fn facade(&self) -> Result<&McpFacade, HttpError> {
        self.facade
            .as_ref()
            .ok_or_else(|| WrapperError::NotInitialised.into())
    }

    pub fn proxy(&self) -> Result<&WrapperProxy, HttpError> {
        self.proxy
            .as_ref()
            .ok_or_else(|| WrapperError::NotInitialised.into())
    }
}

/// Log the configuration summary and every warning it carries.
///
/// Never logs key values, only which providers are configured and how many
/// API keys are accepted.
pub fn log_startup(config: &BridgeConfig) {
    let providers: Vec<String> = config
        .configured_providers()
        .iter()
        .map(ToString::to_string)
        .collect();
    if !providers.is_empty() {
        info!(providers = %providers.join(", "), "LLM API keys configured");
    }

    if config.auth_enabled() {
        info!(
            keys = config.api_keys().len(),
            "API authentication enabled for /mcp/* and /wrapper/* endpoints"
        );
    }

    for warning in config.warnings() {
        match warning {
            ConfigWarning::NoLlmProviderKeys => error!("{warning}"),
            ConfigWarning::AuthenticationDisabled => warn!("{warning}"),
        }
    }

    info!(
        wrapper_url = %config.wrapper_url(),
        asgi_target = %config.effective_asgi_target(),
        timeout = ?config.timeout(),
        "Wrapper settings"
    );
}

/// Build the application context from the configuration snapshot.
///
/// Failing to initialise the wrapper client is not fatal: the process stays
/// up so `/health` and `/healthz` keep answering.
pub fn bootstrap(config: Arc<BridgeConfig>) -> Result<AppContext> {
    log_startup(&config);

    let port: Option<Arc<dyn EvaluationPort>> = if config.has_llm_provider() {
        match WrapperClient::from_config(&config) {
            Ok(client) => {
                info!(base_url = %client.base_url(), "Wrapper client initialised");
                Some(Arc::new(client) as Arc<dyn EvaluationPort>)
            }
            Err(e) => {
                error!(
                    error = %e,
                    "Failed to initialise wrapper client; MCP endpoints will return 503"
                );
                None
            }
        }
    } else {
        None
    };

    AppContext::new(config, port)
}

/// Spawn the wrapper sidecar and wait for it to answer `/health`.
///
/// Failures are logged, not returned: `/healthz` reports the wrapper state.
async fn launch_sidecar(config: &BridgeConfig, opts: &SidecarOptions) -> Option<WrapperSidecar> {
    if !config.has_llm_provider() {
        warn!("Not launching wrapper sidecar: no LLM provider keys configured");
        return None;
    }

    let sidecar_config = match SidecarConfig::from_bridge(
        config,
        opts.python.clone(),
        opts.wrapper_dir.clone(),
        opts.startup_timeout,
    ) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid wrapper sidecar configuration");
            return None;
        }
    };

    let mut sidecar = match WrapperSidecar::spawn(&sidecar_config) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to launch wrapper sidecar");
            return None;
        }
    };

    if let Err(e) = sidecar.wait_ready().await {
        error!(error = %e, "Wrapper sidecar did not become ready");
    }
    Some(sidecar)
}

/// Cancel `token` on Ctrl-C or SIGTERM.
pub fn spawn_signal_listener(token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => info!("Received Ctrl-C"),
            () = terminate => info!("Received SIGTERM"),
        }
        token.cancel();
    });
}

/// Start the facade and run until `cancel` fires.
///
/// When the sidecar is enabled it is launched before the listener binds and
/// stopped after the server has drained.
pub async fn start_server(
    config: BridgeConfig,
    server: ServerConfig,
    cancel: CancellationToken,
) -> Result<()> {
    let config = Arc::new(config);

    let sidecar = match &server.sidecar {
        Some(opts) => launch_sidecar(&config, opts).await,
        None => None,
    };

    let ctx = bootstrap(Arc::clone(&config))?;
    let app = create_router(ctx);

    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("DeepEval MCP bridge listening on http://{}", listener.local_addr()?);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await;
    info!("HTTP server shut down");

    if let Some(sidecar) = sidecar {
        match sidecar.shutdown().await {
            Ok(status) => info!(%status, "Wrapper sidecar stopped"),
            Err(e) => warn!(error = %e, "Wrapper sidecar shutdown failed"),
        }
    }

    served.context("HTTP server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Arc<BridgeConfig> {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        Arc::new(BridgeConfig::from_lookup(|k| map.get(k).map(|v| (*v).to_string())).unwrap())
    }

    #[test]
    fn missing_provider_keys_leave_wrapper_uninitialised() {
        let ctx = bootstrap(config(&[("API_KEYS", "k")])).unwrap();
        assert!(ctx.facade.is_none());
        assert!(ctx.proxy.is_none());
        assert!(ctx.verifier.is_enabled());
        assert_eq!(
            ctx.facade().err().map(|e| e.kind()),
            Some("wrapper_unavailable")
        );
    }

    #[test]
    fn provider_key_initialises_wrapper() {
        let ctx = bootstrap(config(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("DEEPEVAL_WRAPPER_URL", "http://127.0.0.1:9555"),
        ]))
        .unwrap();
        assert!(ctx.facade().is_ok());
        assert_eq!(ctx.proxy().unwrap().base_url(), "http://127.0.0.1:9555");
        assert!(!ctx.verifier.is_enabled());
    }

    #[test]
    fn default_server_config_matches_cli_defaults() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8000);
        assert!(server.sidecar.is_none());
    }
}
