//! Provider error types.

use lexidrill_core::LookupFailure;
use thiserror::Error;

/// Errors that can occur when talking to an HTTP collaborator.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Authentication failed (invalid API key or bot token).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The response body could not be interpreted.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Map a reqwest transport error, reporting timeouts with `timeout_secs`.
    pub fn from_reqwest(e: reqwest::Error, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout(timeout_secs)
        } else {
            ProviderError::NetworkError(e.to_string())
        }
    }

    /// Classify an HTTP error status.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ProviderError::AuthenticationFailed(message),
            _ => ProviderError::ApiError { status, message },
        }
    }
}

impl From<ProviderError> for LookupFailure {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::AuthenticationFailed(m) => LookupFailure::AuthenticationFailed(m),
            ProviderError::ApiError { status, message } => {
                LookupFailure::ApiError { status, message }
            }
            ProviderError::Parse(m) => LookupFailure::Parse(m),
            ProviderError::Timeout(secs) => LookupFailure::Timeout(secs),
            ProviderError::NetworkError(m) => LookupFailure::NetworkError(m),
        }
    }
}
