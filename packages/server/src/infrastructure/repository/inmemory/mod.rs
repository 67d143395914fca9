//! InMemory 実装
//!
//! 全ての Repository は 1 つの `InMemoryDatabase` を共有します。
//! これにより `InMemoryTransactionManager` が Room・メッセージ・監査ログを
//! 跨いだ all-or-nothing の書き込みを提供できます。

mod audit_log;
mod database;
mod message;
mod room;
mod transaction;

pub use audit_log::InMemoryAuditLogRepository;
pub use database::InMemoryDatabase;
pub use message::InMemoryMessageRepository;
pub use room::InMemoryRoomRepository;
pub use transaction::InMemoryTransactionManager;
