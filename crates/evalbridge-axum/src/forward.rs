//! Raw request forwarding to the wrapper for `/wrapper/*`.
//!
//! The facade does not interpret these routes. Method, path suffix, query,
//! headers and body go to the wrapper unchanged apart from hop-by-hop
//! headers, and the wrapper's response is streamed back as-is.

use axum::body::{Body, HttpBody};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use evalbridge_core::WRAPPER_MOUNT_PATH;
use futures_util::TryStreamExt;
use reqwest::Client;
use tracing::{debug, error};

use crate::error::HttpError;

/// Path prefix the pass-through routes are mounted under.
pub const WRAPPER_PREFIX: &str = WRAPPER_MOUNT_PATH;

/// Headers that should NOT be forwarded (hop-by-hop headers).
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
    // Recomputed by the client for the new connection
    "host",
    "content-length",
];

/// Check if a header should be forwarded.
fn should_forward_header(name: &str) -> bool {
    let lower = name.to_lowercase();
    !HOP_BY_HOP_HEADERS.contains(&lower.as_str())
}

fn filter_headers(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| should_forward_header(name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Forwards `/wrapper/*` requests to the wrapper's HTTP surface.
#[derive(Debug, Clone)]
pub struct WrapperProxy {
    client: Client,
    base_url: String,
}

impl WrapperProxy {
    /// The client carries no overall timeout: pass-through routes include
    /// long-running sync evaluations and streamed downloads.
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upstream URL for an inbound `/wrapper...` URI.
    pub fn upstream_url(&self, uri: &Uri) -> String {
        let suffix = uri
            .path()
            .strip_prefix(WRAPPER_PREFIX)
            .filter(|rest| !rest.is_empty())
            .unwrap_or("/");
        match uri.query() {
            Some(query) => format!("{}{suffix}?{query}", self.base_url),
            None => format!("{}{suffix}", self.base_url),
        }
    }

    /// Forward one request and stream the response back.
    ///
    /// The request body is streamed upstream without buffering, so uploads
    /// are not bound by any facade-side size limit.
    pub async fn forward(
        &self,
        method: Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: Body,
    ) -> Result<Response, HttpError> {
        let upstream_url = self.upstream_url(uri);
        debug!(method = %method, upstream = %upstream_url, "Forwarding to wrapper");

        let mut request = self
            .client
            .request(method, &upstream_url)
            .headers(filter_headers(headers));
        // Bodiless requests stay bodiless instead of becoming empty chunked uploads
        if body.size_hint().exact() != Some(0) {
            request = request.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let response = request
            .send()
            .await
            .map_err(|e| {
                error!(upstream = %upstream_url, error = %e, "Failed to reach wrapper");
                HttpError::BadGateway(format!("Error while calling deepeval wrapper: {e}"))
            })?;

        let status = response.status();
        let upstream_headers = filter_headers(response.headers());
        debug!(upstream = %upstream_url, status = status.as_u16(), "Wrapper responded");

        let body = Body::from_stream(response.bytes_stream().map_err(std::io::Error::other));
        let mut out = Response::builder()
            .status(status)
            .body(body)
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response());
        *out.headers_mut() = upstream_headers;
        Ok(out)
    }
}
