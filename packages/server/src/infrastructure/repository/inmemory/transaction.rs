//! InMemory Transaction 実装
//!
//! 書き込みは `StagedWrite` として溜めておき、`commit` 時に DB のロックを
//! 取得した状態で検証 → 反映を一度に行います。commit されずに drop された
//! トランザクションの書き込みは単に破棄されます（ロールバック）。
//!
//! ステージング中の書き込みは他の読み取りからは見えないため、
//! read committed 相当の分離レベルになります。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use crate::domain::{
    AuditLogEntry, RepositoryError, Room, RoomId, Timestamp, Transaction, TransactionManager,
};

use super::{InMemoryDatabase, database::Tables};

/// ステージングされた書き込み
#[derive(Debug, Clone)]
enum StagedWrite {
    InsertRoom(Room),
    DeleteRoom(RoomId),
    DeleteMessages(RoomId),
    AppendAuditLog { text: String, created_at: Timestamp },
}

/// インメモリ TransactionManager 実装
pub struct InMemoryTransactionManager {
    db: Arc<InMemoryDatabase>,
}

impl InMemoryTransactionManager {
    pub fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionManager for InMemoryTransactionManager {
    async fn begin(&self) -> Result<Box<dyn Transaction>, RepositoryError> {
        Ok(Box::new(InMemoryTransaction {
            db: self.db.clone(),
            staged: Vec::new(),
            finished: false,
        }))
    }
}

/// インメモリ Transaction 実装
struct InMemoryTransaction {
    db: Arc<InMemoryDatabase>,
    staged: Vec<StagedWrite>,
    finished: bool,
}

impl InMemoryTransaction {
    fn ensure_active(&self) -> Result<(), RepositoryError> {
        if self.finished {
            return Err(RepositoryError::Storage(
                "transaction already committed".to_string(),
            ));
        }
        Ok(())
    }

    /// 現在のコミット済み状態にステージング済みの書き込みと `next` を
    /// 順に適用できるか検証する
    async fn stage(&mut self, next: StagedWrite) -> Result<(), RepositoryError> {
        self.ensure_active()?;
        {
            let tables = self.db.lock().await;
            validate(&tables, self.staged.iter().chain(std::iter::once(&next)))?;
        }
        self.staged.push(next);
        Ok(())
    }
}

/// Room の存在有無を追跡しながら書き込み列を検証する
fn validate<'a>(
    tables: &Tables,
    writes: impl Iterator<Item = &'a StagedWrite>,
) -> Result<(), RepositoryError> {
    let mut overlay: HashMap<&RoomId, bool> = HashMap::new();
    let exists = |overlay: &HashMap<&RoomId, bool>, id: &RoomId| {
        overlay
            .get(id)
            .copied()
            .unwrap_or_else(|| tables.rooms.contains_key(id))
    };

    for write in writes {
        match write {
            StagedWrite::InsertRoom(room) => {
                if exists(&overlay, &room.id) {
                    return Err(RepositoryError::RoomAlreadyExists(room.id.to_string()));
                }
                overlay.insert(&room.id, true);
            }
            StagedWrite::DeleteRoom(id) => {
                if !exists(&overlay, id) {
                    return Err(RepositoryError::RoomNotFound(id.to_string()));
                }
                overlay.insert(id, false);
            }
            StagedWrite::DeleteMessages(_) | StagedWrite::AppendAuditLog { .. } => {}
        }
    }
    Ok(())
}

fn apply(tables: &mut Tables, write: StagedWrite) {
    match write {
        StagedWrite::InsertRoom(room) => {
            tables.rooms.insert(room.id.clone(), room);
        }
        StagedWrite::DeleteRoom(id) => {
            tables.rooms.remove(&id);
        }
        StagedWrite::DeleteMessages(id) => {
            tables.messages.remove(&id);
        }
        StagedWrite::AppendAuditLog { text, created_at } => {
            let id = tables.next_audit_id;
            tables.next_audit_id += 1;
            tables.audit_log.push(AuditLogEntry {
                id,
                text,
                created_at,
            });
        }
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn insert_room(&mut self, room: &Room) -> Result<(), RepositoryError> {
        self.stage(StagedWrite::InsertRoom(room.clone())).await
    }

    async fn delete_room(&mut self, room_id: &RoomId) -> Result<(), RepositoryError> {
        self.stage(StagedWrite::DeleteRoom(room_id.clone())).await
    }

    async fn delete_messages(&mut self, room_id: &RoomId) -> Result<(), RepositoryError> {
        self.stage(StagedWrite::DeleteMessages(room_id.clone()))
            .await
    }

    async fn append_audit_log(&mut self, text: &str) -> Result<(), RepositoryError> {
        let created_at = Timestamp::new(self.db.now_millis());
        self.stage(StagedWrite::AppendAuditLog {
            text: text.to_string(),
            created_at,
        })
        .await
    }

    async fn commit(&mut self) -> Result<(), RepositoryError> {
        self.ensure_active()?;
        let mut tables = self.db.lock().await;
        // ステージング後に他のトランザクションがコミットしている可能性があるため再検証
        validate(&tables, self.staged.iter())?;
        for write in self.staged.drain(..) {
            apply(&mut tables, write);
        }
        self.finished = true;
        Ok(())
    }
}
