//! InMemory Message Repository 実装

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    ChatMessage, MessageId, MessageRepository, RepositoryError, RoomId, StoredMessage,
};

use super::InMemoryDatabase;

/// インメモリ Message Repository 実装
///
/// MessageId は DB 全体の連番で、採番と追加は同じロック内で行われる。
/// そのため、ある Room の履歴に ID `n` が含まれていれば、その Room の
/// `n` 未満の ID のメッセージも必ず含まれる。
pub struct InMemoryMessageRepository {
    db: Arc<InMemoryDatabase>,
}

impl InMemoryMessageRepository {
    pub fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(
        &self,
        room_id: &RoomId,
        message: &ChatMessage,
    ) -> Result<MessageId, RepositoryError> {
        let mut tables = self.db.lock().await;
        if !tables.rooms.contains_key(room_id) {
            return Err(RepositoryError::RoomNotFound(room_id.to_string()));
        }

        let id = MessageId::new(tables.next_message_id);
        tables.next_message_id += 1;
        tables
            .messages
            .entry(room_id.clone())
            .or_default()
            .push(StoredMessage::new(id, message.clone()));
        Ok(id)
    }

    async fn list(&self, room_id: &RoomId) -> Result<Vec<StoredMessage>, RepositoryError> {
        let tables = self.db.lock().await;
        if !tables.rooms.contains_key(room_id) {
            return Err(RepositoryError::RoomNotFound(room_id.to_string()));
        }

        let mut messages = tables.messages.get(room_id).cloned().unwrap_or_default();
        messages.sort_by_key(|stored| (stored.message.timestamp, stored.id));
        Ok(messages)
    }
}
