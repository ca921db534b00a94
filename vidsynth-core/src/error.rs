//! Error types for vidsynth-core

use thiserror::Error;

/// Main error type for the vidsynth-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{context}: {status}")]
    Api {
        /// Short description of the operation, e.g. "Request failed"
        context: String,
        /// HTTP status code
        status: u16,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Event stream transport error
    #[error("event stream error: {0}")]
    Stream(String),
}

impl Error {
    /// Build an [`Error::Api`] from a response status.
    pub fn api(context: &str, status: reqwest::StatusCode) -> Self {
        Error::Api {
            context: context.to_string(),
            status: status.as_u16(),
        }
    }
}

/// Result type alias for vidsynth-core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_matches_inline_format() {
        let err = Error::api("Upload failed", reqwest::StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_string(), "Upload failed: 413");
    }
}
