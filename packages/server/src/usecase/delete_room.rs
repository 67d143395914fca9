//! UseCase: Room 削除処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DeleteRoomUseCase::execute() メソッド
//! - メッセージ削除 → Room 削除 → 監査ログ追記 が同一トランザクションで行われること
//!
//! ### なぜこのテストが必要か
//! - 途中で失敗した場合に Room・メッセージ・監査ログのどれも変更されないことを保証
//! - 削除後は接続中の参加者が解放され、以後の送信が RoomNotFound になることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：削除、接続中の参加者の解放
//! - 異常系：不正な ID、存在しない Room、監査ログの追記失敗

use std::sync::Arc;

use crate::{
    domain::{RepositoryError, RoomId, TransactionManager},
    registry::RoomRegistry,
};

use super::error::DeleteRoomError;

/// Room 削除のユースケース
pub struct DeleteRoomUseCase {
    transaction_manager: Arc<dyn TransactionManager>,
    registry: Arc<RoomRegistry>,
}

impl DeleteRoomUseCase {
    pub fn new(transaction_manager: Arc<dyn TransactionManager>, registry: Arc<RoomRegistry>) -> Self {
        Self {
            transaction_manager,
            registry,
        }
    }

    /// Room 削除を実行
    ///
    /// トランザクションが commit されるまで Registry には触れない。
    /// commit 後に配信キューを破棄し、接続中の参加者のストリームを終了させる。
    pub async fn execute(&self, room_id: String) -> Result<(), DeleteRoomError> {
        let room_id = RoomId::new(room_id).map_err(DeleteRoomError::InvalidRoomId)?;

        let mut tx = self
            .transaction_manager
            .begin()
            .await
            .map_err(DeleteRoomError::DeletionFailed)?;
        tx.delete_messages(&room_id)
            .await
            .map_err(Self::map_error)?;
        tx.delete_room(&room_id).await.map_err(Self::map_error)?;
        tx.append_audit_log(&format!("Deleted chat with id: {}", room_id))
            .await
            .map_err(Self::map_error)?;
        tx.commit().await.map_err(Self::map_error)?;

        self.registry.unregister_room(&room_id).await;

        tracing::info!(room_id = %room_id, "room deleted");
        Ok(())
    }

    fn map_error(e: RepositoryError) -> DeleteRoomError {
        match e {
            RepositoryError::RoomNotFound(id) => DeleteRoomError::RoomNotFound(id),
            other => DeleteRoomError::DeletionFailed(other),
        }
    }
}
