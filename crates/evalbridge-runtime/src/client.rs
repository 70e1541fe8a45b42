//! HTTP adapter for the evaluation wrapper.
//!
//! Implements [`EvaluationPort`] by calling the wrapper service's own routes.
//! Payload values are never logged; only their top-level keys.

use std::time::Duration;

use async_trait::async_trait;
use evalbridge_core::{BridgeConfig, EvaluationPort, WrapperError};
use reqwest::{Client, Method};
use serde_json::{Value, json};
use tracing::{debug, error, info};

/// Header the wrapper checks for its own API-key authentication.
const API_KEY_HEADER: &str = "X-API-Key";

/// Pooled HTTP client bound to one wrapper base URL.
#[derive(Debug, Clone)]
pub struct WrapperClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    api_key: Option<String>,
}

impl WrapperClient {
    /// Create a client for `base_url`.
    ///
    /// `api_key`, when set, is sent on every internal call so a wrapper that
    /// shares the facade's `API_KEYS` accepts them.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        api_key: Option<String>,
    ) -> Result<Self, WrapperError> {
        let http = Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(timeout)
            .build()
            .map_err(|e| WrapperError::Transport(e.to_string()))?;

        info!(base_url, timeout = ?timeout, "Initialising wrapper client");

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            api_key,
        })
    }

    /// Create a client from the configuration snapshot.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, WrapperError> {
        Self::new(
            config.wrapper_url().as_str(),
            config.timeout(),
            config.api_keys().first().cloned(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<reqwest::Response, WrapperError> {
        let payload_keys: Option<Vec<&String>> =
            payload.and_then(Value::as_object).map(|o| o.keys().collect());
        debug!(method = %method, path, payload_keys = ?payload_keys, "Request to wrapper");

        let mut builder = self.http.request(method.clone(), self.endpoint(path));
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        if let Some(body) = payload {
            builder = builder.json(body);
        }

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                error!(method = %method, path, "Wrapper request timed out");
                WrapperError::Timeout(self.timeout)
            } else {
                error!(method = %method, path, error = %e, "Wrapper request failed");
                WrapperError::Transport(e.to_string())
            }
        })
    }

    /// Send a request and decode the JSON body.
    async fn request_json(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<Value, WrapperError> {
        let response = self.send(method, path, payload).await?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                WrapperError::Timeout(self.timeout)
            } else {
                WrapperError::Transport(e.to_string())
            }
        })?;

        debug!(path, status = status.as_u16(), content_length = bytes.len(), "Wrapper response");

        if status.as_u16() >= 400 {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            error!(path, status = status.as_u16(), "Wrapper returned error status");
            return Err(WrapperError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if bytes.is_empty() {
            return Ok(json!({}));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            error!(path, "Failed to parse wrapper response as JSON");
            WrapperError::InvalidJson(e.to_string())
        })
    }
}

#[async_trait]
impl EvaluationPort for WrapperClient {
    async fn evaluate(&self, payload: Value) -> Result<Value, WrapperError> {
        self.request_json(Method::POST, "/evaluate/", Some(&payload))
            .await
    }

    async fn list_metrics(&self) -> Result<Value, WrapperError> {
        self.request_json(Method::GET, "/metrics/", None).await
    }

    async fn metric_categories(&self) -> Result<Value, WrapperError> {
        self.request_json(Method::GET, "/metrics/categories", None)
            .await
    }

    async fn metric_info(&self, metric_type: &str) -> Result<Value, WrapperError> {
        let path = format!("/metrics/{}", urlencoding::encode(metric_type));
        self.request_json(Method::GET, &path, None).await
    }

    async fn ping(&self) -> Result<Value, WrapperError> {
        let response = self.send(Method::GET, "/health", None).await?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| WrapperError::Transport(e.to_string()))?;
        if status >= 400 {
            return Err(WrapperError::Status { status, body: text });
        }
        // Health bodies are not always JSON.
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}
