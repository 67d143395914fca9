//! Domain layer errors.

use thiserror::Error;

/// Validation errors raised while constructing value objects
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("invalid room id '{0}': expected a UUID")]
    InvalidRoomId(String),

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username exceeds {0} characters")]
    UsernameTooLong(usize),

    #[error("username '{0}' contains control characters")]
    InvalidUsername(String),

    #[error("message text must not be empty")]
    EmptyMessageText,

    #[error("message text exceeds {0} characters")]
    MessageTextTooLong(usize),
}

/// Errors returned by the persistence ports
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("room '{0}' already exists")]
    RoomAlreadyExists(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Errors raised by a participant's outbound stream
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("stream closed")]
    Closed,

    #[error("failed to encode message: {0}")]
    Encode(String),
}
