//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{
        CreateRoomRequest, CreateRoomResponse, RoomDetailDto, RoomSummaryDto, SendMessageRequest,
        SendMessageResponse,
    },
    ui::{error::ApiError, state::AppState},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a room for the given participants
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), ApiError> {
    let room_id = state.create_room_usecase.execute(request.usernames).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            id: room_id.into_string(),
        }),
    ))
}

/// Delete a room, its messages and its live connections
pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.delete_room_usecase.execute(room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Post a message to a room
///
/// Responds once the message is persisted and queued for delivery.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), ApiError> {
    let id = state
        .send_message_usecase
        .execute(room_id, request.from, request.text, request.timestamp)
        .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SendMessageResponse { id: id.value() }),
    ))
}

/// Get list of rooms
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummaryDto>>, ApiError> {
    let rooms = state.get_rooms_usecase.execute().await?;

    // Domain Model から DTO への変換
    Ok(Json(rooms.into_iter().map(RoomSummaryDto::from).collect()))
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    let detail = state.get_room_detail_usecase.execute(room_id).await?;
    Ok(Json(RoomDetailDto::from(detail)))
}
