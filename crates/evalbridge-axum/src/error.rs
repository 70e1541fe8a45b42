//! HTTP error type and mappings from the core error enums.
//!
//! Every failure the facade can produce ends up here and is rendered as
//! `{"error": ..., "status": ..., "type": ...}`. The `type` discriminant is
//! stable so clients can branch on it without parsing messages.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use evalbridge_core::{AuthError, WrapperError};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Missing or unknown `X-API-Key`.
    #[error("Invalid API key")]
    Unauthorized,

    /// Request body could not be understood.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The wrapper does not know the requested resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The wrapper client is not initialised.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The wrapper did not answer in time.
    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    /// The wrapper failed or answered with something unusable.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error type discriminant.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "authentication_failed",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::ServiceUnavailable(_) => "wrapper_unavailable",
            Self::GatewayTimeout(_) => "upstream_timeout",
            Self::BadGateway(_) => "upstream_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Map a failed metric lookup, keeping the wrapper's 404 as a 404.
    pub fn from_metric_lookup(err: WrapperError) -> Self {
        match err {
            WrapperError::Status { status: 404, body } => Self::NotFound(body),
            other => other.into(),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Unauthorized => "Invalid API key".to_string(),
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::ServiceUnavailable(msg)
            | Self::GatewayTimeout(msg)
            | Self::BadGateway(msg)
            | Self::Internal(msg) => msg.clone(),
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    #[serde(rename = "type")]
    error_type: &'static str,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.message(),
            status: status.as_u16(),
            error_type: self.kind(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<WrapperError> for HttpError {
    fn from(err: WrapperError) -> Self {
        match err {
            WrapperError::NotInitialised => Self::ServiceUnavailable(err.to_string()),
            WrapperError::Timeout(_) => Self::GatewayTimeout("Wrapper call timed out".to_string()),
            WrapperError::Transport(_)
            | WrapperError::Status { .. }
            | WrapperError::InvalidJson(_)
            | WrapperError::UnexpectedShape(_) => Self::BadGateway(err.to_string()),
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(_: AuthError) -> Self {
        Self::Unauthorized
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
