//! Shared HTTP plumbing for sources.

use std::time::Duration;

use tracing::debug;

use crate::error::{SourceError, SourceResult};

/// Builds a client with a bounded per-request timeout.
pub(crate) fn build_client(source_name: &str, timeout: Duration) -> SourceResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(format!("contestcal/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            SourceError::configuration(source_name, format!("failed to create HTTP client: {}", e))
        })
}

/// GETs `url` and returns the body, failing on non-success statuses.
pub(crate) async fn get_text(
    client: &reqwest::Client,
    source_name: &str,
    url: &str,
) -> SourceResult<String> {
    debug!("fetching {} listing from {}", source_name, url);

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            SourceError::network(source_name, "request timeout")
        } else if e.is_connect() {
            SourceError::network(source_name, format!("connection failed: {}", e))
        } else {
            SourceError::network(source_name, format!("request failed: {}", e))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            source_name: source_name.to_string(),
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| SourceError::network(source_name, format!("failed to read response: {}", e)))
}
