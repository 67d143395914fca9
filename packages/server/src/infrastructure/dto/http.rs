//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

/// `POST /api/rooms` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub usernames: Vec<String>,
}

/// `POST /api/rooms` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub id: String,
}

/// `POST /api/rooms/{room_id}/messages` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub from: String,
    pub text: String,
    pub timestamp: i64,
}

/// `POST /api/rooms/{room_id}/messages` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub id: u64,
}

/// Room summary for list API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub participants: Vec<String>,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

/// Room detail for detail API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub participants: Vec<String>,
    pub connected: Vec<String>,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

/// Error body returned by every endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
