//! Health check utilities for the wrapper service.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

/// Per-probe bound, independent of the evaluation timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Check HTTP health of a service at `health_url`.
///
/// Makes a single request and returns whether the service answered 2xx.
/// Connection failures count as "not healthy" rather than errors.
pub async fn check_http_health(client: &Client, health_url: &str) -> bool {
    match client.get(health_url).timeout(PROBE_TIMEOUT).send().await {
        Ok(response) if response.status().is_success() => true,
        Ok(response) => {
            debug!(
                status = response.status().as_u16(),
                "Health check returned non-success status"
            );
            false
        }
        Err(e) => {
            debug!("Health check failed: {e}");
            false
        }
    }
}
