//! WebSocket を使った MessageStream 実装
//!
//! ## 責務
//!
//! - ドメインの `ChatMessage` を JSON にシリアライズして送信チャネルに流す
//! - 接続の生存期間に紐づくキャンセルトークンを保持する
//!
//! WebSocket の生成とソケットへの書き込み（pusher loop）は UI 層
//! （`ui/handler/websocket.rs`）で行われます。この実装は生成された
//! 容量付きの `Sender` を受け取り、送信に使用します。
//! ソケットへの書き込みが詰まるとチャネルが満杯になり、`send` はキャンセルされるまで待機します。

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ChatMessage, MessageStream, StreamError},
    infrastructure::dto::websocket as dto,
};

/// WebSocket 接続 1 本分の MessageStream
pub struct WebSocketMessageStream {
    sender: mpsc::Sender<String>,
    token: CancellationToken,
}

impl WebSocketMessageStream {
    pub fn new(sender: mpsc::Sender<String>, token: CancellationToken) -> Self {
        Self { sender, token }
    }
}

#[async_trait]
impl MessageStream for WebSocketMessageStream {
    async fn send(&self, message: &ChatMessage) -> Result<(), StreamError> {
        if self.token.is_cancelled() {
            return Err(StreamError::Closed);
        }
        let frame = dto::ChatMessage::from(message.clone());
        let json =
            serde_json::to_string(&frame).map_err(|e| StreamError::Encode(e.to_string()))?;
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(StreamError::Closed),
            sent = self.sender.send(json) => sent.map_err(|_| StreamError::Closed),
        }
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}
