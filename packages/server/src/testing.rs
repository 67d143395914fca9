//! Test helpers shared by unit tests across the crate.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    ChatMessage, MessageStream, MessageText, Room, RoomId, RoomIdFactory, StreamError, Timestamp,
    TransactionManager, Username,
};
use crate::infrastructure::repository::{InMemoryDatabase, InMemoryTransactionManager};

/// A stream that forwards every write to a channel and counts writes
pub(crate) struct RecordingStream {
    sent: mpsc::UnboundedSender<ChatMessage>,
    token: CancellationToken,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingStream {
    pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ChatMessage>) {
        let (sent, received) = mpsc::unbounded_channel();
        let stream = Arc::new(Self {
            sent,
            token: CancellationToken::new(),
            writes: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        });
        (stream, received)
    }

    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    /// Make every later write fail as if the transport broke
    pub(crate) fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageStream for RecordingStream {
    async fn send(&self, message: &ChatMessage) -> Result<(), StreamError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StreamError::Closed);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.sent
            .send(message.clone())
            .map_err(|_| StreamError::Closed)
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

/// A stream whose writes never complete, like a peer that stopped reading
pub(crate) struct StalledStream {
    token: CancellationToken,
}

impl StalledStream {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            token: CancellationToken::new(),
        })
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}

#[async_trait]
impl MessageStream for StalledStream {
    async fn send(&self, _message: &ChatMessage) -> Result<(), StreamError> {
        std::future::pending().await
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

pub(crate) fn username(name: &str) -> Username {
    Username::new(name.to_string()).unwrap()
}

pub(crate) fn chat_message(from: &str, text: &str, timestamp: i64) -> ChatMessage {
    ChatMessage::new(
        username(from),
        MessageText::new(text.to_string()).unwrap(),
        Timestamp::new(timestamp),
    )
}

/// Persist a room directly through a committed transaction
pub(crate) async fn persist_room(db: &Arc<InMemoryDatabase>, participants: &[&str]) -> RoomId {
    let room = Room::new(
        RoomIdFactory::generate(),
        participants.iter().map(|name| username(name)).collect(),
        Timestamp::new(0),
    );
    let mut tx = InMemoryTransactionManager::new(db.clone())
        .begin()
        .await
        .unwrap();
    tx.insert_room(&room).await.unwrap();
    tx.commit().await.unwrap();
    room.id
}

/// Receive the next message or panic after one second
pub(crate) async fn recv_within(rx: &mut mpsc::UnboundedReceiver<ChatMessage>) -> ChatMessage {
    tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("stream channel closed")
}

/// Assert that nothing arrives within 100ms
pub(crate) async fn assert_silent(rx: &mut mpsc::UnboundedReceiver<ChatMessage>) {
    let result = tokio::time::timeout(std::time::Duration::from_millis(100), rx.recv()).await;
    assert!(result.is_err(), "unexpected message: {:?}", result);
}
