//! In-process [`RecordStore`] for tests and local experiments.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use datarules_core::entity::EntityKind;
use datarules_core::record::{Fields, StoredRecord};
use datarules_core::rules::engine::apply_operations;
use datarules_core::rules::{BulkOperation, BulkWriteResult, Rule};
use datarules_core::types::DbId;

use crate::error::StoreError;
use crate::store::RecordStore;

#[derive(Default)]
struct Inner {
    next_id: DbId,
    rules: Vec<Rule>,
    records: HashMap<EntityKind, Vec<StoredRecord>>,
    failing: HashSet<EntityKind>,
    writes: Vec<(EntityKind, usize)>,
}

/// Mutex-guarded snapshot of rules and records.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        let store = Self::default();
        store.lock().rules = rules;
        store
    }

    /// Insert records of `kind`, assigning sequential IDs. Returns the IDs.
    pub fn insert(&self, kind: EntityKind, records: Vec<Fields>) -> Vec<DbId> {
        let mut inner = self.lock();
        let mut ids = Vec::with_capacity(records.len());
        for fields in records {
            inner.next_id += 1;
            let id = inner.next_id;
            inner
                .records
                .entry(kind)
                .or_default()
                .push(StoredRecord::new(id, fields));
            ids.push(id);
        }
        ids
    }

    pub fn records(&self, kind: EntityKind) -> Vec<StoredRecord> {
        self.lock().records.get(&kind).cloned().unwrap_or_default()
    }

    /// Make every read and write for `kind` fail.
    pub fn fail_kind(&self, kind: EntityKind) {
        self.lock().failing.insert(kind);
    }

    /// Number of bulk writes submitted so far, with their batch sizes.
    pub fn writes(&self) -> Vec<(EntityKind, usize)> {
        self.lock().writes.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self, kind: EntityKind) -> Result<(), StoreError> {
        if self.lock().failing.contains(&kind) {
            return Err(StoreError::Unavailable(format!("{kind} is offline")));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load_rules(&self) -> Result<Vec<Rule>, StoreError> {
        Ok(self.lock().rules.clone())
    }

    async fn load_records(&self, kind: EntityKind) -> Result<Vec<StoredRecord>, StoreError> {
        self.check(kind)?;
        Ok(self.records(kind))
    }

    async fn bulk_write(
        &self,
        kind: EntityKind,
        operations: &[BulkOperation],
    ) -> Result<BulkWriteResult, StoreError> {
        self.check(kind)?;
        let mut inner = self.lock();
        inner.writes.push((kind, operations.len()));

        let records = inner.records.entry(kind).or_default();
        let existing: HashSet<DbId> = records.iter().map(|r| r.id).collect();
        let mut result = BulkWriteResult::default();
        for op in operations.iter().filter(|op| existing.contains(&op.id())) {
            match op {
                BulkOperation::Update { .. } => result.modified_count += 1,
                BulkOperation::Delete { .. } => result.deleted_count += 1,
            }
        }
        apply_operations(records, operations);
        Ok(result)
    }
}
