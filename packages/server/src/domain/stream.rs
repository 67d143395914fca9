//! MessageStream trait 定義
//!
//! 接続中の参加者 1 人分の送信チャネルと、その接続の生存期間に紐づく
//! キャンセルシグナルを表す抽象です。
//!
//! - WebSocket 実装: `infrastructure::stream::WebSocketMessageStream`
//! - テストでは送信内容を記録する実装を使う

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{ChatMessage, StreamError};

/// 参加者へのメッセージ送信チャネル
#[async_trait]
pub trait MessageStream: Send + Sync {
    /// メッセージを送信する（送信順は保持される）
    async fn send(&self, message: &ChatMessage) -> Result<(), StreamError>;

    /// 接続が切れた時にキャンセルされるトークン
    fn cancellation_token(&self) -> CancellationToken;
}
