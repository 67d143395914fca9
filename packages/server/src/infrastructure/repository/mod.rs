//! Repository 実装
//!
//! - `inmemory`: プロセス内のインメモリ DB を使った実装
//! - 将来的に: `postgres` など

pub mod inmemory;

pub use inmemory::{
    InMemoryAuditLogRepository, InMemoryDatabase, InMemoryMessageRepository,
    InMemoryRoomRepository, InMemoryTransactionManager,
};
