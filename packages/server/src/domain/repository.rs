//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## トランザクション
//!
//! Room の作成・削除は監査ログの追記と同一トランザクションで行う必要があるため、
//! 書き込み系の操作は `Transaction` に集約しています。
//!
//! - `TransactionManager::begin` でトランザクションを開始
//! - `Transaction` の各メソッドで書き込みをステージング
//! - `Transaction::commit` で全ての書き込みを原子的に反映
//! - commit せずに drop した場合は全ての書き込みが破棄される（ロールバック）

use async_trait::async_trait;

use super::{
    AuditLogEntry, ChatMessage, MessageId, RepositoryError, Room, RoomId, StoredMessage,
};

/// Room Repository trait（読み取り系）
///
/// Room の作成・削除は `Transaction` 経由でのみ行う。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 永続化されている全ての Room ID を取得
    async fn list_ids(&self) -> Result<Vec<RoomId>, RepositoryError>;

    /// 永続化されている全ての Room を作成日時順に取得
    async fn list(&self) -> Result<Vec<Room>, RepositoryError>;

    /// Room を取得（存在しない場合は `None`）
    async fn get(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError>;
}

/// Message Repository trait
///
/// ## 実装が守るべき契約
///
/// - `append` が返す MessageId は Room ごとに単調増加する
/// - `list` の結果に ID `n` が含まれるなら、同じ Room で `n` 未満の ID を
///   持つメッセージも全て含まれる（ID の採番順と可視になる順が一致する）
///
/// 接続時の履歴再送は `list` で得た最大 ID を境界として、それ以下の ID の
/// ライブ配信を読み飛ばす。採番順と commit 順がずれるストア（例えば
/// 自動採番の ID が commit 順と一致しない SQL テーブル）では境界より小さい
/// ID が後から可視になり、そのメッセージはライブ配信でも届かなくなる。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを永続化し、採番された MessageId を返す
    async fn append(
        &self,
        room_id: &RoomId,
        message: &ChatMessage,
    ) -> Result<MessageId, RepositoryError>;

    /// Room のメッセージ履歴を (timestamp, id) 順に取得
    async fn list(&self, room_id: &RoomId) -> Result<Vec<StoredMessage>, RepositoryError>;
}

/// Audit Log Repository trait（読み取り系）
///
/// 追記は `Transaction::append_audit_log` 経由でのみ行う。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// 監査ログを追記順に取得
    async fn list(&self) -> Result<Vec<AuditLogEntry>, RepositoryError>;
}

/// トランザクションの開始を担う trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// read committed 分離レベルのトランザクションを開始
    async fn begin(&self) -> Result<Box<dyn Transaction>, RepositoryError>;
}

/// 1 つのトランザクション
///
/// 書き込みはステージングされ、`commit` で全て反映されるか、1 つも反映されないかのどちらか。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transaction: Send {
    /// Room を追加（既に存在する場合は `RoomAlreadyExists`）
    async fn insert_room(&mut self, room: &Room) -> Result<(), RepositoryError>;

    /// Room を削除（存在しない場合は `RoomNotFound`）
    async fn delete_room(&mut self, room_id: &RoomId) -> Result<(), RepositoryError>;

    /// Room の全メッセージを削除
    async fn delete_messages(&mut self, room_id: &RoomId) -> Result<(), RepositoryError>;

    /// 監査ログを追記
    async fn append_audit_log(&mut self, text: &str) -> Result<(), RepositoryError>;

    /// ステージングされた書き込みを原子的に反映
    async fn commit(&mut self) -> Result<(), RepositoryError>;
}
