//! Error types of the core.

use thiserror::Error;

/// Errors surfaced by the hub handle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// The hub event loop has terminated (shutdown or panic).
    #[error("hub is not running")]
    Stopped,
}

/// Transport failures of a single connection.
///
/// These never leave the connection that produced them: they end its loops
/// and lead to unregistration.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no frame received within {0:?}")]
    ReadTimeout(std::time::Duration),

    #[error("read failed: {0}")]
    Read(String),

    #[error("write did not complete within {0:?}")]
    WriteTimeout(std::time::Duration),

    #[error("write failed: {0}")]
    Write(String),
}
