//! Persistence seam used by the runner.

use async_trait::async_trait;
use datarules_core::entity::EntityKind;
use datarules_core::record::StoredRecord;
use datarules_core::rules::{BulkOperation, BulkWriteResult, Rule};
use datarules_db::repositories::{RecordRepo, RuleRepo};
use datarules_db::DbPool;

use crate::error::StoreError;

/// Read-all and bulk-write primitives the runner needs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every stored rule in stored order.
    async fn load_rules(&self) -> Result<Vec<Rule>, StoreError>;

    /// Snapshot of every record of `kind`.
    async fn load_records(&self, kind: EntityKind) -> Result<Vec<StoredRecord>, StoreError>;

    /// Apply one kind's batch. An empty batch is a no-op.
    async fn bulk_write(
        &self,
        kind: EntityKind,
        operations: &[BulkOperation],
    ) -> Result<BulkWriteResult, StoreError>;
}

/// [`RecordStore`] backed by the Postgres repositories.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn load_rules(&self) -> Result<Vec<Rule>, StoreError> {
        let rows = RuleRepo::list_all(&self.pool).await?;
        let rules = rows
            .iter()
            .map(|row| row.to_rule())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rules)
    }

    async fn load_records(&self, kind: EntityKind) -> Result<Vec<StoredRecord>, StoreError> {
        let rows = RecordRepo::list_by_entity_type(&self.pool, kind).await?;
        Ok(rows.into_iter().map(|row| row.into_stored()).collect())
    }

    async fn bulk_write(
        &self,
        kind: EntityKind,
        operations: &[BulkOperation],
    ) -> Result<BulkWriteResult, StoreError> {
        Ok(RecordRepo::bulk_write(&self.pool, kind, operations).await?)
    }
}
