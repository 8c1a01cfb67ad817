//! Error types for the Hookcast terminal client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server URL could not be parsed
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An established session was interrupted
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// The webhook request could not be sent
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered the webhook with a non-success status
    #[error("Server rejected the webhook with status {0}")]
    Rejected(reqwest::StatusCode),
}
