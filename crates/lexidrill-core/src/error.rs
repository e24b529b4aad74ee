//! Lookup error types.
//!
//! These errors represent failures of the vocabulary collaborator (word
//! batches and thesaurus lookups). Defined in `lexidrill-core` so the
//! scheduler and command handlers can classify them without string matching.

use thiserror::Error;

/// Errors that can occur while fetching words, definitions or related words.
#[derive(Debug, Error)]
pub enum LookupFailure {
    /// The dictionary has no entry for the requested word.
    #[error("word not found: {0}")]
    NotFound(String),

    /// Authentication failed (missing or invalid API key).
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

    /// A local word list could not be read or was empty.
    #[error("word list unavailable: {0}")]
    WordList(String),
}

impl LookupFailure {
    /// Returns `true` if retrying on the next tick cannot help.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            LookupFailure::AuthenticationFailed(_) | LookupFailure::WordList(_)
        )
    }
}
