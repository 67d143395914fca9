//! UseCase: Room 詳細取得処理
//!
//! 作成時に登録された参加者に加えて、現在接続中の参加者を返します。

use std::sync::Arc;

use crate::{
    domain::{Room, RoomId, RoomRepository, Username},
    registry::RoomRegistry,
};

use super::error::GetRoomDetailError;

/// Room の詳細
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDetail {
    pub room: Room,
    /// 現在接続中の参加者（名前順）
    pub connected: Vec<Username>,
}

/// Room 詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    room_repository: Arc<dyn RoomRepository>,
    registry: Arc<RoomRegistry>,
}

impl GetRoomDetailUseCase {
    pub fn new(room_repository: Arc<dyn RoomRepository>, registry: Arc<RoomRegistry>) -> Self {
        Self {
            room_repository,
            registry,
        }
    }

    pub async fn execute(&self, room_id: String) -> Result<RoomDetail, GetRoomDetailError> {
        let room_id = RoomId::new(room_id).map_err(GetRoomDetailError::InvalidRoomId)?;
        let room = self
            .room_repository
            .get(&room_id)
            .await
            .map_err(GetRoomDetailError::LoadFailed)?
            .ok_or_else(|| GetRoomDetailError::RoomNotFound(room_id.to_string()))?;
        let connected = self
            .registry
            .participants(&room_id)
            .await
            .unwrap_or_default();
        Ok(RoomDetail { room, connected })
    }
}
