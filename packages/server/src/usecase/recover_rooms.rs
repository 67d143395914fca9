//! UseCase: 起動時の Room 復元
//!
//! 永続化されている全ての Room について配信キューを用意する。
//! サーバーがリクエストを受け付ける前に 1 回だけ実行される。

use std::sync::Arc;

use crate::{domain::RoomRepository, registry::RoomRegistry};

use super::error::RecoverRoomsError;

/// Room 復元のユースケース
pub struct RecoverRoomsUseCase {
    room_repository: Arc<dyn RoomRepository>,
    registry: Arc<RoomRegistry>,
}

impl RecoverRoomsUseCase {
    pub fn new(room_repository: Arc<dyn RoomRepository>, registry: Arc<RoomRegistry>) -> Self {
        Self {
            room_repository,
            registry,
        }
    }

    /// 復元を実行し、新たに登録した Room の数を返す
    pub async fn execute(&self) -> Result<usize, RecoverRoomsError> {
        let room_ids = self
            .room_repository
            .list_ids()
            .await
            .map_err(RecoverRoomsError::LoadFailed)?;

        let mut registered = 0;
        for room_id in room_ids {
            if self.registry.register_room(room_id).await {
                registered += 1;
            }
        }

        tracing::info!(rooms = registered, "rooms recovered");
        Ok(registered)
    }
}
