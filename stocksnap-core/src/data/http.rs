//! Shared blocking HTTP client construction.

use std::time::Duration;

use super::provider::DataError;

const USER_AGENT: &str = concat!("stocksnap/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::blocking::Client, DataError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))
}

/// Map a transport-level reqwest error onto [`DataError`].
pub(crate) fn transport_error(e: reqwest::Error) -> DataError {
    // Strip the URL: it may carry an API key in its query string.
    let e = e.without_url();
    DataError::NetworkUnreachable(e.to_string())
}
