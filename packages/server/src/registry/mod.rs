//! Room registry: the in-process authority over live rooms.
//!
//! The registry maps each known room to an owned [`RoomState`] record
//! (delivery queue, attached subscribers, closure signal). Each registered
//! room runs one dispatcher task that pops the delivery queue and hands every
//! item to the subscribers attached at that moment. Each connected
//! participant runs its own forwarding loop (see [`RoomRegistry::connect`])
//! that writes to its stream.
//!
//! ## Locking
//!
//! - the room map is behind one `RwLock`, write-locked only by
//!   [`RoomRegistry::register_room`] and [`RoomRegistry::unregister_room`];
//! - every room guards its own subscriber set with its own `RwLock`, so a
//!   broadcast costs O(participants in that room) and never blocks other rooms.
//!
//! ## Backpressure
//!
//! Delivery queues and per-connection buffers are bounded by the same
//! capacity. A participant whose stream stops accepting writes fills its
//! buffer, then the room's queue, and from then on [`RoomRegistry::enqueue`]
//! waits. The room is released once that participant's connection ends or
//! the room is unregistered.
//!
//! ## History versus live traffic
//!
//! A connecting participant is attached for live delivery *before* history
//! is read. Live items are buffered while history is replayed, and any
//! buffered item whose [`MessageId`] is at or below the highest id replayed
//! is skipped. A message sent concurrently with a connect therefore reaches
//! the new participant exactly once.

mod room_state;

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

use thiserror::Error;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    MessageId, MessageRepository, MessageStream, RoomId, StoredMessage, StreamError, Username,
};

use room_state::{RoomState, Subscription, run_dispatcher};

/// Default capacity of a room's delivery queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("stream failure: {0}")]
    Stream(#[from] StreamError),
}

/// Thread-safe bookkeeping of live rooms and their connected streams
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, Arc<RoomState>>>,
    queue_capacity: usize,
    message_repository: Arc<dyn MessageRepository>,
}

impl RoomRegistry {
    /// Create a registry whose rooms use `DEFAULT_QUEUE_CAPACITY`
    pub fn new(message_repository: Arc<dyn MessageRepository>) -> Self {
        Self::with_queue_capacity(message_repository, DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a registry with a custom delivery queue capacity (at least 1)
    pub fn with_queue_capacity(
        message_repository: Arc<dyn MessageRepository>,
        queue_capacity: usize,
    ) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
            message_repository,
        }
    }

    /// Create the delivery queue for `room_id` unless it already exists.
    ///
    /// Returns `true` if a new queue was created. An existing queue, and
    /// anything still waiting in it, is left untouched.
    pub async fn register_room(&self, room_id: RoomId) -> bool {
        let mut rooms = self.rooms.write().await;
        match rooms.entry(room_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                let (state, queue) = RoomState::new(entry.key().clone(), self.queue_capacity);
                let state = Arc::new(state);
                tokio::spawn(run_dispatcher(state.clone(), queue));
                tracing::info!(room_id = %entry.key(), "room registered");
                entry.insert(state);
                true
            }
        }
    }

    /// Remove the room and release every stream attached to it.
    ///
    /// Returns `false` if the room was not registered.
    pub async fn unregister_room(&self, room_id: &RoomId) -> bool {
        let removed = self.rooms.write().await.remove(room_id);
        match removed {
            Some(state) => {
                state.close().await;
                tracing::info!(room_id = %room_id, "room unregistered");
                true
            }
            None => false,
        }
    }

    /// Whether a delivery queue is registered for `room_id`
    pub async fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.read().await.contains_key(room_id)
    }

    /// All registered room ids, sorted
    pub async fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Participants currently connected to `room_id`
    pub async fn participants(&self, room_id: &RoomId) -> Option<Vec<Username>> {
        let state = self.room(room_id).await?;
        Some(state.participants().await)
    }

    /// Push a persisted message onto the room's delivery queue.
    ///
    /// Waits while the queue is full. Fails with `RoomNotFound` if the room is
    /// unknown or is unregistered while waiting.
    pub async fn enqueue(
        &self,
        room_id: &RoomId,
        message: StoredMessage,
    ) -> Result<(), RegistryError> {
        let state = self
            .room(room_id)
            .await
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.to_string()))?;
        state.push(message).await
    }

    /// Attach `stream` to `room_id` as `participant` and deliver room traffic
    /// until the stream is cancelled, the room is unregistered, or the
    /// participant reconnects elsewhere.
    ///
    /// History is replayed first; a failure to load it is logged and the
    /// participant continues with live traffic only. A failed write to
    /// `stream` ends this participant's loop with `RegistryError::Stream`.
    pub async fn connect(
        &self,
        room_id: &RoomId,
        participant: Username,
        stream: Arc<dyn MessageStream>,
    ) -> Result<(), RegistryError> {
        let state = self
            .room(room_id)
            .await
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.to_string()))?;

        let mut subscription = state.attach(participant.clone()).await?;
        tracing::info!(
            room_id = %room_id,
            participant = %participant,
            connection_id = subscription.connection_id,
            "participant connected"
        );

        let cancel = stream.cancellation_token();
        let result = self
            .forward(&state, &mut subscription, stream.as_ref(), &cancel)
            .await;

        state
            .detach(&participant, subscription.connection_id)
            .await;
        match &result {
            Ok(()) => tracing::info!(
                room_id = %room_id,
                participant = %participant,
                "participant disconnected"
            ),
            Err(e) => tracing::warn!(
                room_id = %room_id,
                participant = %participant,
                "participant stream terminated: {}",
                e
            ),
        }
        result
    }

    async fn room(&self, room_id: &RoomId) -> Option<Arc<RoomState>> {
        self.rooms.read().await.get(room_id).cloned()
    }

    async fn forward(
        &self,
        state: &RoomState,
        subscription: &mut Subscription,
        stream: &dyn MessageStream,
        cancel: &CancellationToken,
    ) -> Result<(), RegistryError> {
        let released = subscription.released.clone();
        let watermark = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            _ = state.closed_token().cancelled() => return Ok(()),
            _ = released.cancelled() => return Ok(()),
            replayed = self.replay_history(state.room_id(), stream) => replayed?,
        };

        loop {
            let stored = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                _ = state.closed_token().cancelled() => return Ok(()),
                _ = released.cancelled() => return Ok(()),
                item = subscription.live.recv() => match item {
                    Some(stored) => stored,
                    None => return Ok(()),
                },
            };
            if watermark.is_some_and(|w| stored.id <= w) {
                continue;
            }

            // A stream that stops accepting writes holds its buffer full
            // until the connection ends.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                _ = state.closed_token().cancelled() => return Ok(()),
                _ = released.cancelled() => return Ok(()),
                sent = stream.send(&stored.message) => sent?,
            }
        }
    }

    /// Write the room's history to `stream` and return the highest id sent
    async fn replay_history(
        &self,
        room_id: &RoomId,
        stream: &dyn MessageStream,
    ) -> Result<Option<MessageId>, StreamError> {
        let history = match self.message_repository.list(room_id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(room_id = %room_id, "failed to load history: {}", e);
                return Ok(None);
            }
        };

        let mut watermark = None;
        for stored in &history {
            stream.send(&stored.message).await?;
            watermark = watermark.max(Some(stored.id));
        }
        tracing::debug!(room_id = %room_id, replayed = history.len(), "history replayed");
        Ok(watermark)
    }
}

impl Drop for RoomRegistry {
    fn drop(&mut self) {
        for state in self.rooms.get_mut().values() {
            state.closed_token().cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockMessageRepository, RepositoryError, RoomIdFactory},
        infrastructure::repository::{InMemoryDatabase, InMemoryMessageRepository},
        testing::{
            RecordingStream, StalledStream, assert_silent, chat_message, persist_room,
            recv_within, username,
        },
    };
    use std::time::Duration;
    use tokio::task::JoinHandle;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - Room の登録・登録解除と冪等性
    // - 接続・切断時の購読者の登録と削除
    // - 履歴の再送とライブ配信の順序・重複排除
    // - 1 回の送信で接続中の全参加者に 1 回ずつ配信されること
    //
    // 【なぜこのテストが必要か】
    // - Registry は並行に動く複数の接続とメッセージ送信の中核
    // - 取りこぼし・二重配信は利用者から直接見える不具合になる
    // ========================================

    struct Fixture {
        registry: Arc<RoomRegistry>,
        messages: Arc<InMemoryMessageRepository>,
        room_id: RoomId,
    }

    async fn fixture() -> Fixture {
        let db = InMemoryDatabase::new();
        let room_id = persist_room(&db, &["alice", "bob", "carol"]).await;
        let messages = Arc::new(InMemoryMessageRepository::new(db));
        let registry = Arc::new(RoomRegistry::new(messages.clone()));
        registry.register_room(room_id.clone()).await;
        Fixture {
            registry,
            messages,
            room_id,
        }
    }

    fn spawn_connect(
        registry: &Arc<RoomRegistry>,
        room_id: &RoomId,
        name: &str,
        stream: Arc<RecordingStream>,
    ) -> JoinHandle<Result<(), RegistryError>> {
        let registry = registry.clone();
        let room_id = room_id.clone();
        let participant = username(name);
        tokio::spawn(async move { registry.connect(&room_id, participant, stream).await })
    }

    async fn wait_for_participants(registry: &RoomRegistry, room_id: &RoomId, count: usize) {
        for _ in 0..100 {
            if registry
                .participants(room_id)
                .await
                .is_some_and(|p| p.len() == count)
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} participants");
    }

    /// Persist then enqueue, the way the message gateway does
    async fn send(fixture: &Fixture, from: &str, text: &str, timestamp: i64) {
        let message = chat_message(from, text, timestamp);
        let id = fixture
            .messages
            .append(&fixture.room_id, &message)
            .await
            .unwrap();
        fixture
            .registry
            .enqueue(&fixture.room_id, StoredMessage::new(id, message))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_connect_unknown_room_fails() {
        // テスト項目: 登録されていない Room への接続は RoomNotFound になる
        // given (前提条件):
        let registry = RoomRegistry::new(Arc::new(InMemoryMessageRepository::new(
            InMemoryDatabase::new(),
        )));
        let room_id = RoomIdFactory::generate();
        let (stream, _rx) = RecordingStream::new();

        // when (操作):
        let result = registry.connect(&room_id, username("alice"), stream).await;

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::RoomNotFound(room_id.to_string())));
    }

    #[tokio::test]
    async fn test_enqueue_unknown_room_fails() {
        // テスト項目: 登録されていない Room への enqueue は RoomNotFound になる
        // given (前提条件):
        let registry = RoomRegistry::new(Arc::new(InMemoryMessageRepository::new(
            InMemoryDatabase::new(),
        )));
        let room_id = RoomIdFactory::generate();
        let message = StoredMessage::new(MessageId::new(1), chat_message("a", "hi", 1));

        // when (操作):
        let result = registry.enqueue(&room_id, message).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RegistryError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_register_room_is_idempotent() {
        // テスト項目: 同じ Room を 2 回登録してもキューは 1 つのままで、中身もリセットされない
        // given (前提条件):
        let f = fixture().await;
        let (stream, mut rx) = RecordingStream::new();
        let handle = spawn_connect(&f.registry, &f.room_id, "alice", stream);
        wait_for_participants(&f.registry, &f.room_id, 1).await;

        // when (操作):
        let created_again = f.registry.register_room(f.room_id.clone()).await;
        send(&f, "bob", "still here", 1).await;

        // then (期待する結果):
        assert!(!created_again);
        assert_eq!(f.registry.room_ids().await, vec![f.room_id.clone()]);
        assert_eq!(recv_within(&mut rx).await.text.as_str(), "still here");
        assert_eq!(
            f.registry.participants(&f.room_id).await,
            Some(vec![username("alice")])
        );
        handle.abort();
    }

    #[tokio::test]
    async fn test_live_message_delivered_exactly_once() {
        // テスト項目: A が接続した後に B が送信したメッセージを A はちょうど 1 回受信する
        // given (前提条件):
        let f = fixture().await;
        let (stream, mut rx) = RecordingStream::new();
        let _handle = spawn_connect(&f.registry, &f.room_id, "alice", stream.clone());
        wait_for_participants(&f.registry, &f.room_id, 1).await;

        // when (操作):
        send(&f, "bob", "M1", 100).await;

        // then (期待する結果):
        let received = recv_within(&mut rx).await;
        assert_eq!(received, chat_message("bob", "M1", 100));
        assert_silent(&mut rx).await;
        assert_eq!(stream.writes(), 1);
    }

    #[tokio::test]
    async fn test_history_replayed_before_live_traffic() {
        // テスト項目: 接続前に永続化された M1, M2 が timestamp 順に、その後のライブメッセージより先に届く
        // given (前提条件):
        let f = fixture().await;
        let m2 = chat_message("bob", "M2", 20);
        let m1 = chat_message("alice", "M1", 10);
        f.messages.append(&f.room_id, &m2).await.unwrap();
        f.messages.append(&f.room_id, &m1).await.unwrap();

        // when (操作):
        let (stream, mut rx) = RecordingStream::new();
        let _handle = spawn_connect(&f.registry, &f.room_id, "carol", stream);
        wait_for_participants(&f.registry, &f.room_id, 1).await;
        send(&f, "alice", "M3", 30).await;

        // then (期待する結果):
        assert_eq!(recv_within(&mut rx).await, m1);
        assert_eq!(recv_within(&mut rx).await, m2);
        assert_eq!(recv_within(&mut rx).await.text.as_str(), "M3");
        assert_silent(&mut rx).await;
    }

    #[tokio::test]
    async fn test_message_in_history_and_queue_is_not_duplicated() {
        // テスト項目: 永続化済みかつキューに残っているメッセージは、履歴とライブで二重に届かない
        // given (前提条件): 接続前に永続化され、キューにも積まれたがまだ配信されていないメッセージ
        let db = InMemoryDatabase::new();
        let room_id = persist_room(&db, &["alice", "bob"]).await;
        let messages = Arc::new(InMemoryMessageRepository::new(db));
        let registry = RoomRegistry::new(messages.clone());
        let (state, mut queue) = RoomState::new(room_id.clone(), 4);
        let state = Arc::new(state);
        registry
            .rooms
            .write()
            .await
            .insert(room_id.clone(), state.clone());

        let message = chat_message("bob", "in flight", 5);
        let id = messages.append(&room_id, &message).await.unwrap();
        registry
            .enqueue(&room_id, StoredMessage::new(id, message.clone()))
            .await
            .unwrap();

        // when (操作): 接続（履歴再送）後にキューの中身が配信される
        let registry = Arc::new(registry);
        let (stream, mut rx) = RecordingStream::new();
        let _handle = spawn_connect(&registry, &room_id, "alice", stream.clone());
        assert_eq!(recv_within(&mut rx).await, message);
        let queued = queue.recv().await.unwrap();
        state.broadcast(&queued).await;

        // then (期待する結果):
        assert_silent(&mut rx).await;
        assert_eq!(stream.writes(), 1);
    }

    #[tokio::test]
    async fn test_fan_out_writes_once_per_participant() {
        // テスト項目: N 人が接続中のとき、1 回の送信でちょうど N 回のストリーム書き込みが行われる
        // given (前提条件):
        let f = fixture().await;
        let mut streams = Vec::new();
        for name in ["alice", "bob", "carol"] {
            let (stream, rx) = RecordingStream::new();
            spawn_connect(&f.registry, &f.room_id, name, stream.clone());
            streams.push((stream, rx));
        }
        wait_for_participants(&f.registry, &f.room_id, 3).await;

        // when (操作):
        send(&f, "alice", "hello all", 1).await;

        // then (期待する結果):
        for (stream, rx) in streams.iter_mut() {
            assert_eq!(recv_within(rx).await.text.as_str(), "hello all");
            assert_silent(rx).await;
            assert_eq!(stream.writes(), 1);
        }
    }

    #[tokio::test]
    async fn test_cancelled_stream_is_removed_and_not_written() {
        // テスト項目: キャンセルされたストリームは購読者から削除され、以後書き込まれない
        // given (前提条件):
        let f = fixture().await;
        let (alice, mut alice_rx) = RecordingStream::new();
        let (bob, mut bob_rx) = RecordingStream::new();
        let alice_handle = spawn_connect(&f.registry, &f.room_id, "alice", alice.clone());
        let _bob_handle = spawn_connect(&f.registry, &f.room_id, "bob", bob.clone());
        wait_for_participants(&f.registry, &f.room_id, 2).await;

        // when (操作):
        alice.cancel();
        let result = tokio::time::timeout(Duration::from_secs(1), alice_handle)
            .await
            .unwrap()
            .unwrap();
        send(&f, "bob", "after cancel", 1).await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(recv_within(&mut bob_rx).await.text.as_str(), "after cancel");
        assert_silent(&mut alice_rx).await;
        assert_eq!(alice.writes(), 0);
        assert_eq!(
            f.registry.participants(&f.room_id).await,
            Some(vec![username("bob")])
        );
    }

    #[tokio::test]
    async fn test_failed_stream_does_not_stop_others() {
        // テスト項目: 1 人のストリーム書き込みが失敗しても、他の参加者への配信は続く
        // given (前提条件):
        let f = fixture().await;
        let (broken, _broken_rx) = RecordingStream::new();
        let (healthy, mut healthy_rx) = RecordingStream::new();
        let broken_handle = spawn_connect(&f.registry, &f.room_id, "alice", broken.clone());
        let _healthy_handle = spawn_connect(&f.registry, &f.room_id, "bob", healthy.clone());
        wait_for_participants(&f.registry, &f.room_id, 2).await;
        broken.fail_writes();

        // when (操作):
        send(&f, "carol", "first", 1).await;
        send(&f, "carol", "second", 2).await;

        // then (期待する結果):
        let result = tokio::time::timeout(Duration::from_secs(1), broken_handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Err(RegistryError::Stream(StreamError::Closed)));
        assert_eq!(recv_within(&mut healthy_rx).await.text.as_str(), "first");
        assert_eq!(recv_within(&mut healthy_rx).await.text.as_str(), "second");
        wait_for_participants(&f.registry, &f.room_id, 1).await;
    }

    #[tokio::test]
    async fn test_unregister_room_ends_connections() {
        // テスト項目: Room の登録解除で接続中の forwarding loop が終了し、以後の enqueue は失敗する
        // given (前提条件):
        let f = fixture().await;
        let (stream, _rx) = RecordingStream::new();
        let handle = spawn_connect(&f.registry, &f.room_id, "alice", stream);
        wait_for_participants(&f.registry, &f.room_id, 1).await;

        // when (操作):
        let removed = f.registry.unregister_room(&f.room_id).await;

        // then (期待する結果):
        assert!(removed);
        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Ok(()));
        assert!(!f.registry.contains(&f.room_id).await);
        let message = StoredMessage::new(MessageId::new(99), chat_message("a", "late", 1));
        assert!(matches!(
            f.registry.enqueue(&f.room_id, message).await,
            Err(RegistryError::RoomNotFound(_))
        ));
        assert!(!f.registry.unregister_room(&f.room_id).await);
    }

    #[tokio::test]
    async fn test_reconnect_replaces_previous_stream() {
        // テスト項目: 同じ参加者が再接続すると古い接続は終了し、新しいストリームだけが受信する
        // given (前提条件):
        let f = fixture().await;
        let (old, mut old_rx) = RecordingStream::new();
        let old_handle = spawn_connect(&f.registry, &f.room_id, "alice", old.clone());
        wait_for_participants(&f.registry, &f.room_id, 1).await;

        // when (操作):
        let (new, mut new_rx) = RecordingStream::new();
        let _new_handle = spawn_connect(&f.registry, &f.room_id, "alice", new);
        let old_result = tokio::time::timeout(Duration::from_secs(1), old_handle)
            .await
            .unwrap()
            .unwrap();
        send(&f, "bob", "to the new stream", 1).await;

        // then (期待する結果):
        assert_eq!(old_result, Ok(()));
        assert_eq!(
            recv_within(&mut new_rx).await.text.as_str(),
            "to the new stream"
        );
        assert_silent(&mut old_rx).await;
        assert_eq!(
            f.registry.participants(&f.room_id).await,
            Some(vec![username("alice")])
        );
    }

    #[tokio::test]
    async fn test_history_failure_is_not_fatal() {
        // テスト項目: 履歴の取得に失敗してもライブ配信は継続される
        // given (前提条件):
        let mut repository = MockMessageRepository::new();
        repository
            .expect_list()
            .returning(|_| Err(RepositoryError::Storage("connection refused".to_string())));
        let registry = Arc::new(RoomRegistry::new(Arc::new(repository)));
        let room_id = RoomIdFactory::generate();
        registry.register_room(room_id.clone()).await;
        let (stream, mut rx) = RecordingStream::new();
        let _handle = spawn_connect(&registry, &room_id, "alice", stream);
        wait_for_participants(&registry, &room_id, 1).await;

        // when (操作):
        let message = StoredMessage::new(MessageId::new(1), chat_message("bob", "live", 1));
        registry.enqueue(&room_id, message).await.unwrap();

        // then (期待する結果):
        assert_eq!(recv_within(&mut rx).await.text.as_str(), "live");
    }

    #[tokio::test]
    async fn test_enqueue_blocks_when_queue_full() {
        // テスト項目: キューが満杯の間は enqueue が待機し、消費されると完了する（バックプレッシャー）
        // given (前提条件): 容量 1 のキューを持ち、dispatcher が動いていない Room
        let db = InMemoryDatabase::new();
        let room_id = persist_room(&db, &["alice"]).await;
        let registry = Arc::new(RoomRegistry::with_queue_capacity(
            Arc::new(InMemoryMessageRepository::new(db)),
            1,
        ));
        let (state, mut queue) = RoomState::new(room_id.clone(), 1);
        registry
            .rooms
            .write()
            .await
            .insert(room_id.clone(), Arc::new(state));
        let first = StoredMessage::new(MessageId::new(1), chat_message("a", "one", 1));
        let second = StoredMessage::new(MessageId::new(2), chat_message("a", "two", 2));
        registry.enqueue(&room_id, first).await.unwrap();

        // when (操作):
        let blocked = {
            let registry = registry.clone();
            let room_id = room_id.clone();
            tokio::spawn(async move { registry.enqueue(&room_id, second).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!blocked.is_finished());
        queue.recv().await.unwrap();

        // then (期待する結果):
        let result = tokio::time::timeout(Duration::from_secs(1), blocked)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn test_blocked_enqueue_released_by_unregister() {
        // テスト項目: キューが満杯で待機中の enqueue は Room の登録解除で RoomNotFound になる
        // given (前提条件): 容量 1 のキューが満杯で、dispatcher が動いていない Room
        let db = InMemoryDatabase::new();
        let room_id = persist_room(&db, &["alice"]).await;
        let registry = Arc::new(RoomRegistry::with_queue_capacity(
            Arc::new(InMemoryMessageRepository::new(db)),
            1,
        ));
        let (state, _queue) = RoomState::new(room_id.clone(), 1);
        registry
            .rooms
            .write()
            .await
            .insert(room_id.clone(), Arc::new(state));
        let first = StoredMessage::new(MessageId::new(1), chat_message("a", "one", 1));
        let second = StoredMessage::new(MessageId::new(2), chat_message("a", "two", 2));
        registry.enqueue(&room_id, first).await.unwrap();
        let blocked = {
            let registry = registry.clone();
            let room_id = room_id.clone();
            tokio::spawn(async move { registry.enqueue(&room_id, second).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!blocked.is_finished());

        // when (操作):
        registry.unregister_room(&room_id).await;

        // then (期待する結果):
        let result = tokio::time::timeout(Duration::from_secs(1), blocked)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result, Err(RegistryError::RoomNotFound(room_id.to_string())));
    }

    #[tokio::test]
    async fn test_stalled_participant_applies_backpressure() {
        // テスト項目: 書き込みが進まない参加者がいると enqueue が待機し、その参加者が切断すると再開する
        // given (前提条件): キュー容量 1 の Room に、書き込みが完了しないストリームで接続
        let db = InMemoryDatabase::new();
        let room_id = persist_room(&db, &["alice"]).await;
        let registry = Arc::new(RoomRegistry::with_queue_capacity(
            Arc::new(InMemoryMessageRepository::new(db)),
            1,
        ));
        registry.register_room(room_id.clone()).await;
        let stalled = StalledStream::new();
        let connection = {
            let registry = registry.clone();
            let room_id = room_id.clone();
            let stream = stalled.clone();
            tokio::spawn(async move { registry.connect(&room_id, username("alice"), stream).await })
        };
        wait_for_participants(&registry, &room_id, 1).await;

        // when (操作): 大量に enqueue する
        let sender = {
            let registry = registry.clone();
            let room_id = room_id.clone();
            tokio::spawn(async move {
                for id in 1..=100 {
                    let message = StoredMessage::new(
                        MessageId::new(id),
                        chat_message("bob", "flood", id as i64),
                    );
                    registry.enqueue(&room_id, message).await?;
                }
                Ok::<(), RegistryError>(())
            })
        };
        tokio::time::sleep(Duration::from_millis(200)).await;

        // then (期待する結果): バッファとキューが埋まった時点で待機している
        assert!(!sender.is_finished());

        // when (操作): 書き込みが止まった参加者が切断する
        stalled.cancel();

        // then (期待する結果): 接続は終了し、待機していた enqueue は全て完了する
        let connect_result = tokio::time::timeout(Duration::from_secs(1), connection)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(connect_result, Ok(()));
        let sent = tokio::time::timeout(Duration::from_secs(2), sender)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sent, Ok(()));
        assert_eq!(registry.participants(&room_id).await, Some(vec![]));
    }
}
