//! Domain layer for the chat server.
//!
//! Entities, value objects and the ports (repository / stream traits) the
//! use cases depend on. Concrete implementations live in the infrastructure
//! layer.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod stream;
pub mod value_object;

pub use entity::{AuditLogEntry, ChatMessage, Room, StoredMessage};
pub use error::{RepositoryError, StreamError, ValueObjectError};
pub use factory::RoomIdFactory;
pub use repository::{
    AuditLogRepository, MessageRepository, RoomRepository, Transaction, TransactionManager,
};
#[cfg(test)]
pub use repository::{
    MockAuditLogRepository, MockMessageRepository, MockRoomRepository, MockTransaction,
    MockTransactionManager,
};
pub use stream::MessageStream;
pub use value_object::{MessageId, MessageText, RoomId, Timestamp, Username};
