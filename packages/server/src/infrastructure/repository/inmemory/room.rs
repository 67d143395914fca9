//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! Room の追加・削除は `InMemoryTransactionManager` 経由で行われます。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{RepositoryError, Room, RoomId, RoomRepository};

use super::InMemoryDatabase;

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    db: Arc<InMemoryDatabase>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn list_ids(&self) -> Result<Vec<RoomId>, RepositoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|room| room.id)
            .collect())
    }

    async fn list(&self) -> Result<Vec<Room>, RepositoryError> {
        let tables = self.db.lock().await;
        let mut rooms: Vec<Room> = tables.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(rooms)
    }

    async fn get(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError> {
        let tables = self.db.lock().await;
        Ok(tables.rooms.get(room_id).cloned())
    }
}
