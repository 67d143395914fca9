//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージの永続化と配信キューへの投入
//!
//! ### なぜこのテストが必要か
//! - 永続化に失敗したメッセージが配信されないことを保証
//! - 永続化が配信より先に行われることを確認（接続時の履歴再送と重複しないための前提）
//!
//! ### どのような状況を想定しているか
//! - 正常系：永続化されて接続中の参加者に配信される
//! - 異常系：存在しない Room、永続化の失敗、不正な入力

use std::sync::Arc;

use crate::{
    domain::{
        ChatMessage, MessageId, MessageRepository, MessageText, RepositoryError, RoomId,
        StoredMessage, Timestamp, Username,
    },
    registry::RoomRegistry,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    message_repository: Arc<dyn MessageRepository>,
    registry: Arc<RoomRegistry>,
}

impl SendMessageUseCase {
    pub fn new(message_repository: Arc<dyn MessageRepository>, registry: Arc<RoomRegistry>) -> Self {
        Self {
            message_repository,
            registry,
        }
    }

    /// メッセージ送信を実行
    ///
    /// 配信キューが満杯の間は空きができるまで待機する（バックプレッシャー）。
    /// 待機中に Room が削除された場合は `RoomNotFound` を返す。
    ///
    /// # Arguments
    ///
    /// * `room_id` - 送信先の Room ID
    /// * `from` - 送信者のユーザー名
    /// * `text` - 本文
    /// * `timestamp` - 送信者が付与した Unix タイムスタンプ（ミリ秒）
    ///
    /// # Returns
    ///
    /// * `Ok(MessageId)` - 永続化時に採番された ID
    /// * `Err(SendMessageError)` - 送信失敗
    pub async fn execute(
        &self,
        room_id: String,
        from: String,
        text: String,
        timestamp: i64,
    ) -> Result<MessageId, SendMessageError> {
        let room_id = RoomId::new(room_id).map_err(SendMessageError::InvalidMessage)?;
        let message = ChatMessage::new(
            Username::new(from).map_err(SendMessageError::InvalidMessage)?,
            MessageText::new(text).map_err(SendMessageError::InvalidMessage)?,
            Timestamp::new(timestamp),
        );

        // 1. Registry に登録されている Room か確認
        if !self.registry.contains(&room_id).await {
            return Err(SendMessageError::RoomNotFound(room_id.to_string()));
        }

        // 2. 永続化（失敗したメッセージは配信しない）
        let id = self
            .message_repository
            .append(&room_id, &message)
            .await
            .map_err(|e| match e {
                RepositoryError::RoomNotFound(id) => SendMessageError::RoomNotFound(id),
                other => SendMessageError::PersistenceFailed(other),
            })?;

        // 3. 配信キューに投入（失敗するのは Room が削除された場合のみ）
        self.registry
            .enqueue(&room_id, StoredMessage::new(id, message))
            .await
            .map_err(|_| SendMessageError::RoomNotFound(room_id.to_string()))?;

        tracing::debug!(room_id = %room_id, message_id = %id, "message accepted");
        Ok(id)
    }
}
