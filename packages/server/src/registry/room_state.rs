//! Per-room state owned by the registry.
//!
//! A `RoomState` bundles everything the registry keeps for one room: the
//! bounded delivery queue, the set of attached subscribers and the signal
//! that fires when the room is unregistered. Keeping them in one record
//! means the queue and the stream set cannot drift apart.
//!
//! Every subscriber buffer is bounded by the same capacity as the delivery
//! queue and the dispatcher waits for room in each buffer. A participant that
//! stops reading therefore fills its buffer, then the delivery queue, and
//! then senders wait in `push`. The room moves at the pace of its slowest
//! attached participant until that participant leaves or the room closes.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;

use crate::domain::{RoomId, StoredMessage, Username};

use super::RegistryError;

/// One attached connection as seen by the dispatcher
struct Subscriber {
    connection_id: u64,
    live: mpsc::Sender<StoredMessage>,
    released: CancellationToken,
}

/// Receiving half handed to the connection that attached.
///
/// Live items are buffered here until the connection has finished replaying
/// history. `released` fires when the connection is replaced by a newer one
/// for the same participant or detached.
pub(crate) struct Subscription {
    pub(crate) connection_id: u64,
    pub(crate) live: mpsc::Receiver<StoredMessage>,
    pub(crate) released: CancellationToken,
}

pub(crate) struct RoomState {
    room_id: RoomId,
    queue: mpsc::Sender<StoredMessage>,
    buffer_capacity: usize,
    subscribers: RwLock<HashMap<Username, Subscriber>>,
    closed: CancellationToken,
    next_connection_id: AtomicU64,
}

impl RoomState {
    /// Create the state and the receiving end of its delivery queue
    pub(crate) fn new(room_id: RoomId, capacity: usize) -> (Self, mpsc::Receiver<StoredMessage>) {
        let (queue, receiver) = mpsc::channel(capacity);
        let state = Self {
            room_id,
            queue,
            buffer_capacity: capacity,
            subscribers: RwLock::new(HashMap::new()),
            closed: CancellationToken::new(),
            next_connection_id: AtomicU64::new(1),
        };
        (state, receiver)
    }

    pub(crate) fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub(crate) fn closed_token(&self) -> &CancellationToken {
        &self.closed
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Register `participant`, replacing any previous connection of theirs
    pub(crate) async fn attach(
        &self,
        participant: Username,
    ) -> Result<Subscription, RegistryError> {
        let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        let (live, receiver) = mpsc::channel(self.buffer_capacity);
        let released = CancellationToken::new();

        let mut subscribers = self.subscribers.write().await;
        if self.is_closed() {
            return Err(RegistryError::RoomNotFound(self.room_id.to_string()));
        }
        if let Some(previous) = subscribers.insert(
            participant.clone(),
            Subscriber {
                connection_id,
                live,
                released: released.clone(),
            },
        ) {
            previous.released.cancel();
            tracing::info!(
                room_id = %self.room_id,
                participant = %participant,
                replaced_connection = previous.connection_id,
                "participant reconnected, previous stream replaced"
            );
        }

        Ok(Subscription {
            connection_id,
            live: receiver,
            released,
        })
    }

    /// Remove `participant` if the entry still belongs to `connection_id`.
    ///
    /// Returns `true` when an entry was removed.
    pub(crate) async fn detach(&self, participant: &Username, connection_id: u64) -> bool {
        let mut subscribers = self.subscribers.write().await;
        match subscribers.get(participant) {
            Some(subscriber) if subscriber.connection_id == connection_id => {
                subscriber.released.cancel();
                subscribers.remove(participant);
                true
            }
            _ => false,
        }
    }

    /// Participants currently attached, sorted by name
    pub(crate) async fn participants(&self) -> Vec<Username> {
        let subscribers = self.subscribers.read().await;
        let mut names: Vec<Username> = subscribers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Push onto the delivery queue, waiting for capacity if it is full.
    ///
    /// A room closed while waiting releases the caller with `RoomNotFound`.
    pub(crate) async fn push(&self, message: StoredMessage) -> Result<(), RegistryError> {
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => {
                Err(RegistryError::RoomNotFound(self.room_id.to_string()))
            }
            sent = self.queue.send(message) => {
                sent.map_err(|_| RegistryError::RoomNotFound(self.room_id.to_string()))
            }
        }
    }

    /// Hand `message` to every subscriber attached right now.
    ///
    /// Waits while a subscriber's buffer is full. The wait for one subscriber
    /// ends when it is released or the room closes. Subscribers whose
    /// connection has gone away are dropped without affecting delivery to the
    /// others. Returns the number of subscribers the message was handed to.
    pub(crate) async fn broadcast(&self, message: &StoredMessage) -> usize {
        // Snapshot so that attach/detach never wait behind a full buffer
        let targets: Vec<(Username, u64, mpsc::Sender<StoredMessage>, CancellationToken)> = {
            let subscribers = self.subscribers.read().await;
            subscribers
                .iter()
                .map(|(participant, subscriber)| {
                    (
                        participant.clone(),
                        subscriber.connection_id,
                        subscriber.live.clone(),
                        subscriber.released.clone(),
                    )
                })
                .collect()
        };

        let mut delivered = 0;
        for (participant, connection_id, live, released) in targets {
            let handed = tokio::select! {
                biased;
                _ = self.closed.cancelled() => return delivered,
                _ = released.cancelled() => false,
                sent = live.send(message.clone()) => sent.is_ok(),
            };
            if handed {
                delivered += 1;
            } else if self.detach(&participant, connection_id).await {
                tracing::warn!(
                    room_id = %self.room_id,
                    participant = %participant,
                    "dropped subscriber whose connection is gone"
                );
            }
        }

        delivered
    }

    /// Close the room: stop the dispatcher and release every subscriber
    pub(crate) async fn close(&self) {
        self.closed.cancel();
        let mut subscribers = self.subscribers.write().await;
        for subscriber in subscribers.values() {
            subscriber.released.cancel();
        }
        subscribers.clear();
    }
}

/// Dispatcher loop of one room: pop each queued item and fan it out.
pub(crate) async fn run_dispatcher(
    state: std::sync::Arc<RoomState>,
    mut queue: mpsc::Receiver<StoredMessage>,
) {
    tracing::debug!(room_id = %state.room_id(), "dispatcher started");
    loop {
        tokio::select! {
            biased;
            _ = state.closed_token().cancelled() => break,
            item = queue.recv() => {
                let Some(message) = item else { break };
                let delivered = state.broadcast(&message).await;
                tracing::debug!(
                    room_id = %state.room_id(),
                    message_id = %message.id,
                    delivered,
                    "message dispatched"
                );
            }
        }
    }
    tracing::debug!(room_id = %state.room_id(), "dispatcher stopped");
}
