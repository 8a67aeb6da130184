//! HTTP client construction.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::cookie::Jar;
use tracing::debug;

use crate::TARGET_WEB_REQUEST;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the shared client. Per-request total timeouts are applied by the
/// fetcher, so the client itself only carries connect and socket-read
/// limits.
pub fn create_http_client() -> Result<reqwest::Client> {
    let cookie_store = Jar::default();
    debug!(target: TARGET_WEB_REQUEST, "Creating HTTP client");

    reqwest::Client::builder()
        .cookie_store(true)
        .cookie_provider(Arc::new(cookie_store))
        .gzip(true)
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .redirect(reqwest::redirect::Policy::default())
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))
}
