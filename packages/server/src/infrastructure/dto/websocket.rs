//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};

/// Kind of a frame pushed from the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    Chat,
}

/// Chat message pushed to a connected participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub r#type: MessageType,
    pub from: String,
    pub text: String,
    pub timestamp: i64,
}

/// Frame sent by a participant over its WebSocket.
///
/// The sender is the username the socket was opened with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub timestamp: i64,
}
