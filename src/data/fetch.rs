use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::Client;

use super::source::SourceLocation;
use crate::error::LoadError;

const USER_AGENT: &str = concat!("toxview/", env!("CARGO_PKG_VERSION"));

/// Read the raw payload behind `location`. One blocking read, no retries.
///
/// `timeout_secs` of `None` leaves the request without a timeout; callers
/// that need one impose it through configuration.
pub fn fetch_bytes(location: &SourceLocation, timeout_secs: Option<u64>) -> Result<Bytes, LoadError> {
    match location {
        SourceLocation::Local(path) => std::fs::read(path)
            .map(Bytes::from)
            .map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            }),
        SourceLocation::Http(url) => fetch_http(url, timeout_secs),
    }
}

fn fetch_http(url: &str, timeout_secs: Option<u64>) -> Result<Bytes, LoadError> {
    let unreachable = |reason: String| LoadError::Unreachable {
        url: url.to_string(),
        reason,
    };

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout_secs.map(Duration::from_secs))
        .build()
        .map_err(|e| unreachable(format!("failed to create HTTP client: {e}")))?;

    log::debug!("GET {url}");
    let response = client
        .get(url)
        .send()
        .map_err(|e| unreachable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .bytes()
        .map_err(|e| unreachable(format!("failed to read response body: {e}")))
}
