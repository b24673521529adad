//! Error types for the backend client.

use thiserror::Error;

/// Unified error type for backend operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status from the server.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid base URL or path join.
    #[error("Invalid URL: {0}")]
    Url(String),
}

impl ClientError {
    /// Create an API error with the given status and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a URL error with the given message.
    pub fn url(msg: impl Into<String>) -> Self {
        Self::Url(msg.into())
    }
}

/// Result type alias for backend operations.
pub type ClientResult<T> = Result<T, ClientError>;
