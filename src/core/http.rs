//! HTTP client utilities.
//!
//! Provides the shared client used by the catalog source and the chat
//! completion client.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::error::{McatError, Result};

/// Timeout for completion calls, which can stream long answers.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("mcat/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| McatError::Config(format!("failed to build HTTP client: {e}")))
}

/// Map a transport error to a timeout or to the caller's error kind.
///
/// `target` names what was being contacted ("catalog", a provider id).
pub(crate) fn map_send_error(
    e: &reqwest::Error,
    target: &str,
    timeout: Duration,
    other: impl FnOnce(String) -> McatError,
) -> McatError {
    if e.is_timeout() {
        McatError::Timeout {
            target: target.to_string(),
            seconds: timeout.as_secs(),
        }
    } else {
        other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_client_with_custom_timeout() {
        assert!(build_client(Duration::from_secs(5)).is_ok());
        assert!(build_client(COMPLETION_TIMEOUT).is_ok());
    }
}
