//! Conversion logic between DTOs and domain entities.

use kaiwa_shared::time::timestamp_to_rfc3339;

use crate::{
    domain::entity,
    infrastructure::dto::{http, websocket as dto},
    usecase::RoomDetail,
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<entity::ChatMessage> for dto::ChatMessage {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            r#type: dto::MessageType::Chat,
            from: model.from.into_string(),
            text: model.text.into_string(),
            timestamp: model.timestamp.value(),
        }
    }
}

impl From<entity::Room> for http::RoomSummaryDto {
    fn from(model: entity::Room) -> Self {
        Self {
            id: model.id.into_string(),
            participants: model
                .participants
                .into_iter()
                .map(|p| p.into_string())
                .collect(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<RoomDetail> for http::RoomDetailDto {
    fn from(detail: RoomDetail) -> Self {
        Self {
            id: detail.room.id.into_string(),
            participants: detail
                .room
                .participants
                .into_iter()
                .map(|p| p.into_string())
                .collect(),
            connected: detail
                .connected
                .into_iter()
                .map(|p| p.into_string())
                .collect(),
            created_at: timestamp_to_rfc3339(detail.room.created_at.value()),
        }
    }
}
