//! UseCase: Room 作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//! - Room の永続化と監査ログの追記が同一トランザクションで行われること
//!
//! ### なぜこのテストが必要か
//! - Room だけが作成されて監査ログが残らない、という中途半端な状態を防ぐ
//! - トランザクションが失敗した場合に Registry が変更されないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：Room 作成、監査ログ追記、Registry への登録
//! - 異常系：参加者が空、不正なユーザー名、監査ログの追記失敗、commit 失敗

use std::sync::Arc;

use kaiwa_shared::time::Clock;

use crate::{
    domain::{Room, RoomId, RoomIdFactory, Timestamp, TransactionManager, Username},
    registry::RoomRegistry,
};

use super::error::CreateRoomError;

/// Room 作成のユースケース
pub struct CreateRoomUseCase {
    transaction_manager: Arc<dyn TransactionManager>,
    registry: Arc<RoomRegistry>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    pub fn new(
        transaction_manager: Arc<dyn TransactionManager>,
        registry: Arc<RoomRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transaction_manager,
            registry,
            clock,
        }
    }

    /// Room 作成を実行
    ///
    /// # Arguments
    ///
    /// * `usernames` - 参加者のユーザー名（1 人以上）
    ///
    /// # Returns
    ///
    /// * `Ok(RoomId)` - 作成された Room の ID
    /// * `Err(CreateRoomError)` - 作成失敗（この場合 Registry は変更されない）
    pub async fn execute(&self, usernames: Vec<String>) -> Result<RoomId, CreateRoomError> {
        // 1. 入力の検証
        if usernames.is_empty() {
            return Err(CreateRoomError::EmptyParticipants);
        }
        let participants = usernames
            .into_iter()
            .map(Username::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(CreateRoomError::InvalidUsername)?;

        // 2. Room と監査ログを同一トランザクションで永続化（重複した参加者は 1 人にまとめる）
        let room = Room::new(
            RoomIdFactory::generate(),
            participants,
            Timestamp::new(self.clock.now_millis()),
        );
        let mut tx = self
            .transaction_manager
            .begin()
            .await
            .map_err(CreateRoomError::CreationFailed)?;
        tx.insert_room(&room)
            .await
            .map_err(CreateRoomError::CreationFailed)?;
        tx.append_audit_log(&format!("Created chat with id: {}", room.id))
            .await
            .map_err(CreateRoomError::CreationFailed)?;
        tx.commit().await.map_err(CreateRoomError::CreationFailed)?;

        // 3. commit 後に配信キューを用意
        self.registry.register_room(room.id.clone()).await;

        tracing::info!(
            room_id = %room.id,
            participants = room.participants.len(),
            "room created"
        );
        Ok(room.id)
    }
}
