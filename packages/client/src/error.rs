//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server does not know the room
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    /// The server rejected the request
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The HTTP request could not be completed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The server URL cannot be used
    #[error("Invalid server URL '{0}'")]
    InvalidUrl(String),
}
