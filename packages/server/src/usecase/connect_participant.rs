//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::validate() / execute() メソッド
//! - 入力の検証と Registry への委譲、エラーの変換
//!
//! ### なぜこのテストが必要か
//! - WebSocket の upgrade 前に検証できるエラー（不正な入力、存在しない Room）を
//!   ステータスコードとして返すための前提
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続してストリームのキャンセルで正常終了
//! - 異常系：不正な入力、存在しない Room、ストリームの書き込み失敗

use std::sync::Arc;

use crate::{
    domain::{MessageStream, RoomId, Username},
    registry::RoomRegistry,
};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    registry: Arc<RoomRegistry>,
}

impl ConnectParticipantUseCase {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 接続要求を検証する
    ///
    /// # Returns
    ///
    /// * `Ok((RoomId, Username))` - 接続可能な Room と参加者
    /// * `Err(ConnectError)` - 不正な入力、または Room が存在しない
    pub async fn validate(
        &self,
        room_id: String,
        username: String,
    ) -> Result<(RoomId, Username), ConnectError> {
        let room_id = RoomId::new(room_id).map_err(ConnectError::InvalidRequest)?;
        let username = Username::new(username).map_err(ConnectError::InvalidRequest)?;
        if !self.registry.contains(&room_id).await {
            return Err(ConnectError::RoomNotFound(room_id.to_string()));
        }
        Ok((room_id, username))
    }

    /// 接続を実行
    ///
    /// 履歴の再送とライブ配信を行い、ストリームがキャンセルされるか
    /// Room が削除されるまで戻らない。
    pub async fn execute(
        &self,
        room_id: &RoomId,
        username: Username,
        stream: Arc<dyn MessageStream>,
    ) -> Result<(), ConnectError> {
        self.registry
            .connect(room_id, username, stream)
            .await
            .map_err(ConnectError::from)
    }
}
