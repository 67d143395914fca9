//! Entities of the chat domain.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::value_object::{MessageId, MessageText, RoomId, Timestamp, Username};

/// Chat room with the participant list recorded at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub participants: Vec<Username>,
    pub created_at: Timestamp,
}

impl Room {
    /// Participants are kept once each, in the order first given
    pub fn new(id: RoomId, participants: Vec<Username>, created_at: Timestamp) -> Self {
        let mut seen = HashSet::new();
        let participants = participants
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();
        Self {
            id,
            participants,
            created_at,
        }
    }
}

/// A message as posted by a participant.
///
/// The timestamp is supplied by the sender, not by the server clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub from: Username,
    pub text: MessageText,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(from: Username, text: MessageText, timestamp: Timestamp) -> Self {
        Self {
            from,
            text,
            timestamp,
        }
    }
}

/// A message after it has been persisted by the message store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: MessageId,
    pub message: ChatMessage,
}

impl StoredMessage {
    pub fn new(id: MessageId, message: ChatMessage) -> Self {
        Self { id, message }
    }
}

/// One line of the append-only audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: u64,
    pub text: String,
    pub created_at: Timestamp,
}
