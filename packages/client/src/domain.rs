//! Domain logic for client-side operations.
//!
//! Pure functions deciding how the runner reacts to a failed session.

use crate::error::ClientError;

/// Check if the client should exit immediately based on the error type.
///
/// A room that does not exist will not appear by retrying, and neither will
/// a request the server refuses.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::RoomNotFound(_) | ClientError::Api { .. } | ClientError::InvalidUrl(_)
    )
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    if should_exit_immediately(error) {
        return false;
    }

    current_attempt < max_attempts
}
