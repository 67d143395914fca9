//! HTTP error type mapping use case errors to status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    infrastructure::dto::http::ErrorResponse,
    usecase::{
        ConnectError, CreateRoomError, DeleteRoomError, GetRoomDetailError, GetRoomsError,
        SendMessageError,
    },
};

/// Error returned by every HTTP handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    NotFound(String),
    Validation(String),
    Forbidden(String),
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, &str) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "ROOM_NOT_FOUND", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "ACCESS_DENIED", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, "{}", message);
        }
        let body = ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CreateRoomError> for ApiError {
    fn from(e: CreateRoomError) -> Self {
        match e {
            CreateRoomError::EmptyParticipants | CreateRoomError::InvalidUsername(_) => {
                ApiError::Validation(e.to_string())
            }
            CreateRoomError::CreationFailed(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DeleteRoomError> for ApiError {
    fn from(e: DeleteRoomError) -> Self {
        match e {
            DeleteRoomError::InvalidRoomId(_) => ApiError::Validation(e.to_string()),
            DeleteRoomError::RoomNotFound(_) => ApiError::NotFound(e.to_string()),
            DeleteRoomError::DeletionFailed(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<SendMessageError> for ApiError {
    fn from(e: SendMessageError) -> Self {
        match e {
            SendMessageError::InvalidMessage(_) => ApiError::Validation(e.to_string()),
            SendMessageError::RoomNotFound(_) => ApiError::NotFound(e.to_string()),
            SendMessageError::PersistenceFailed(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ConnectError> for ApiError {
    fn from(e: ConnectError) -> Self {
        match e {
            ConnectError::InvalidRequest(_) => ApiError::Validation(e.to_string()),
            ConnectError::RoomNotFound(_) => ApiError::NotFound(e.to_string()),
            ConnectError::StreamFailed(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<GetRoomsError> for ApiError {
    fn from(e: GetRoomsError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<GetRoomDetailError> for ApiError {
    fn from(e: GetRoomDetailError) -> Self {
        match e {
            GetRoomDetailError::InvalidRoomId(_) => ApiError::Validation(e.to_string()),
            GetRoomDetailError::RoomNotFound(_) => ApiError::NotFound(e.to_string()),
            GetRoomDetailError::LoadFailed(_) => ApiError::Internal(e.to_string()),
        }
    }
}
