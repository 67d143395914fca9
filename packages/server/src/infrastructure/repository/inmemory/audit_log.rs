//! InMemory Audit Log Repository 実装

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{AuditLogEntry, AuditLogRepository, RepositoryError};

use super::InMemoryDatabase;

/// インメモリ Audit Log Repository 実装
pub struct InMemoryAuditLogRepository {
    db: Arc<InMemoryDatabase>,
}

impl InMemoryAuditLogRepository {
    pub fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLogRepository {
    async fn list(&self) -> Result<Vec<AuditLogEntry>, RepositoryError> {
        let tables = self.db.lock().await;
        Ok(tables.audit_log.clone())
    }
}
