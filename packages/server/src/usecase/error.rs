//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError};
use crate::registry::RegistryError;

/// Room 作成のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CreateRoomError {
    #[error("at least one participant is required")]
    EmptyParticipants,

    #[error("invalid username: {0}")]
    InvalidUsername(ValueObjectError),

    #[error("failed to create room: {0}")]
    CreationFailed(RepositoryError),
}

/// Room 削除のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeleteRoomError {
    #[error("invalid room id: {0}")]
    InvalidRoomId(ValueObjectError),

    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("failed to delete room: {0}")]
    DeletionFailed(RepositoryError),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendMessageError {
    #[error("invalid message: {0}")]
    InvalidMessage(ValueObjectError),

    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("failed to persist message: {0}")]
    PersistenceFailed(RepositoryError),
}

/// 参加者接続のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("invalid connect request: {0}")]
    InvalidRequest(ValueObjectError),

    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("stream failure: {0}")]
    StreamFailed(String),
}

impl From<RegistryError> for ConnectError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::RoomNotFound(id) => ConnectError::RoomNotFound(id),
            RegistryError::Stream(e) => ConnectError::StreamFailed(e.to_string()),
        }
    }
}

/// 起動時の Room 復元のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecoverRoomsError {
    #[error("failed to load rooms: {0}")]
    LoadFailed(RepositoryError),
}

/// Room 詳細取得のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GetRoomDetailError {
    #[error("invalid room id: {0}")]
    InvalidRoomId(ValueObjectError),

    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("failed to load room: {0}")]
    LoadFailed(RepositoryError),
}

/// Room 一覧取得のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GetRoomsError {
    #[error("failed to load rooms: {0}")]
    LoadFailed(RepositoryError),
}
