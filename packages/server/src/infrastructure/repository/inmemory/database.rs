//! インメモリ DB 本体

use std::{collections::HashMap, sync::Arc};

use kaiwa_shared::time::{Clock, SystemClock};
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{AuditLogEntry, Room, RoomId, StoredMessage};

/// テーブル群
///
/// 全てのテーブルは 1 つの Mutex で保護されるため、ロック中の操作は
/// 他の読み書きから見て原子的に行われる。
#[derive(Debug, Default)]
pub(super) struct Tables {
    pub(super) rooms: HashMap<RoomId, Room>,
    pub(super) messages: HashMap<RoomId, Vec<StoredMessage>>,
    pub(super) audit_log: Vec<AuditLogEntry>,
    /// 次に採番する MessageId（全 Room 共通の連番）
    pub(super) next_message_id: u64,
    pub(super) next_audit_id: u64,
}

/// Room・メッセージ・監査ログを保持するインメモリ DB
pub struct InMemoryDatabase {
    tables: Mutex<Tables>,
    clock: Arc<dyn Clock>,
}

impl InMemoryDatabase {
    /// システム時計を使う DB を作成
    pub fn new() -> Arc<Self> {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// 監査ログのタイムスタンプに使う時計を指定して DB を作成
    pub fn with_clock(clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            tables: Mutex::new(Tables {
                next_message_id: 1,
                next_audit_id: 1,
                ..Tables::default()
            }),
            clock,
        })
    }

    pub(super) async fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().await
    }

    pub(super) fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }
}
