//! Process-wide configuration snapshot.
//!
//! The snapshot is built once at startup from environment variables and is
//! read-only afterwards. Secrets (LLM provider keys, accepted API keys) are
//! held here but never rendered by `Debug` or logged.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default module path of the wrapper application.
pub const DEFAULT_WRAPPER_IMPORT_PATH: &str = "app.main";

/// Default base URL of the wrapper service.
pub const DEFAULT_WRAPPER_URL: &str = "http://127.0.0.1:8001";

/// Path the wrapper's own routes are exposed under on the facade.
///
/// The launched wrapper is told about it (`--root-path`) so the links it
/// generates, such as the OpenAPI URL behind `/wrapper/docs`, resolve
/// through the facade.
pub const WRAPPER_MOUNT_PATH: &str = "/wrapper";

/// Default bound on a single wrapper call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

const API_KEYS_VAR: &str = "API_KEYS";
const IMPORT_PATH_VAR: &str = "DEEPEVAL_WRAPPER_IMPORT_PATH";
const ASGI_TARGET_VAR: &str = "DEEPEVAL_WRAPPER_ASGI_TARGET";
const WRAPPER_URL_VAR: &str = "DEEPEVAL_WRAPPER_URL";
const TIMEOUT_VAR: &str = "DEEPEVAL_HTTP_TIMEOUT";

/// LLM providers the wrapper can evaluate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
    Google,
}

impl LlmProvider {
    pub const ALL: [Self; 3] = [Self::OpenAi, Self::Anthropic, Self::Google];

    /// Environment variable holding this provider's key.
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Google => "GOOGLE_API_KEY",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_var())
    }
}

/// Errors that make the configuration unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DEEPEVAL_HTTP_TIMEOUT must be a positive number of seconds, got {0:?}")]
    InvalidTimeout(String),

    #[error("DEEPEVAL_WRAPPER_URL is not a valid http(s) URL: {0:?}")]
    InvalidWrapperUrl(String),
}

/// Non-fatal configuration findings reported at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// None of the LLM provider keys is set; evaluations will fail.
    NoLlmProviderKeys,
    /// `API_KEYS` is empty, so every route is publicly reachable.
    AuthenticationDisabled,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLlmProviderKeys => write!(
                f,
                "No LLM API keys configured. The wrapper requires at least one of: \
                 OPENAI_API_KEY, ANTHROPIC_API_KEY, GOOGLE_API_KEY"
            ),
            Self::AuthenticationDisabled => write!(
                f,
                "API authentication disabled: no API_KEYS configured, \
                 /mcp/* and /wrapper/* are publicly accessible"
            ),
        }
    }
}

/// Immutable configuration snapshot.
#[derive(Clone)]
pub struct BridgeConfig {
    provider_keys: Vec<(LlmProvider, String)>,
    api_keys: Vec<String>,
    wrapper_import_path: String,
    wrapper_asgi_target: Option<String>,
    wrapper_url: Url,
    timeout: Duration,
}

impl BridgeConfig {
    /// Build the snapshot from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the snapshot through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider_keys = LlmProvider::ALL
            .into_iter()
            .filter_map(|p| non_blank(p.env_var()).map(|key| (p, key)))
            .collect();

        let api_keys = parse_api_keys(lookup(API_KEYS_VAR).as_deref().unwrap_or_default());

        let wrapper_import_path =
            non_blank(IMPORT_PATH_VAR).unwrap_or_else(|| DEFAULT_WRAPPER_IMPORT_PATH.to_string());
        let wrapper_asgi_target = non_blank(ASGI_TARGET_VAR);

        let wrapper_url = parse_wrapper_url(
            &non_blank(WRAPPER_URL_VAR).unwrap_or_else(|| DEFAULT_WRAPPER_URL.to_string()),
        )?;

        let timeout = match non_blank(TIMEOUT_VAR) {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            provider_keys,
            api_keys,
            wrapper_import_path,
            wrapper_asgi_target,
            wrapper_url,
            timeout,
        })
    }

    /// Override the wrapper base URL (e.g. from a CLI flag).
    pub fn with_wrapper_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.wrapper_url = parse_wrapper_url(raw)?;
        Ok(self)
    }

    /// Override the wrapper call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Providers whose key is present. Key values are never exposed.
    pub fn configured_providers(&self) -> Vec<LlmProvider> {
        self.provider_keys.iter().map(|(p, _)| *p).collect()
    }

    /// `(variable, value)` pairs to hand to a child wrapper process.
    pub fn provider_env(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.provider_keys
            .iter()
            .map(|(p, key)| (p.env_var(), key.as_str()))
    }

    pub fn has_llm_provider(&self) -> bool {
        !self.provider_keys.is_empty()
    }

    /// Accepted API keys, in configuration order.
    pub fn api_keys(&self) -> &[String] {
        &self.api_keys
    }

    pub fn auth_enabled(&self) -> bool {
        !self.api_keys.is_empty()
    }

    pub fn wrapper_import_path(&self) -> &str {
        &self.wrapper_import_path
    }

    pub fn wrapper_asgi_target(&self) -> Option<&str> {
        self.wrapper_asgi_target.as_deref()
    }

    /// The `module:attribute` target used to launch the wrapper.
    pub fn effective_asgi_target(&self) -> String {
        self.wrapper_asgi_target
            .clone()
            .unwrap_or_else(|| format!("{}:app", self.wrapper_import_path))
    }

    pub const fn wrapper_url(&self) -> &Url {
        &self.wrapper_url
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Non-fatal findings to surface at startup.
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if !self.has_llm_provider() {
            warnings.push(ConfigWarning::NoLlmProviderKeys);
        }
        if !self.auth_enabled() {
            warnings.push(ConfigWarning::AuthenticationDisabled);
        }
        warnings
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("providers", &self.configured_providers())
            .field("api_keys", &format_args!("<{} redacted>", self.api_keys.len()))
            .field("wrapper_import_path", &self.wrapper_import_path)
            .field("wrapper_asgi_target", &self.wrapper_asgi_target)
            .field("wrapper_url", &self.wrapper_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Split a comma separated key list, dropping blanks.
pub fn parse_api_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    raw.parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(Duration::from_secs_f64)
        .ok_or_else(|| ConfigError::InvalidTimeout(raw.to_string()))
}

fn parse_wrapper_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidWrapperUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidWrapperUrl(raw.to_string()));
    }
    Ok(url)
}
