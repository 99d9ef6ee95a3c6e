//! Rule engine planner: pure logic, no database access.
//!
//! Given every stored rule and a snapshot of one entity kind's records,
//! computes the minimal set of bulk operations that brings the stored
//! records in line with the rules. The orchestrator in `datarules-pipeline`
//! does the reading and writing around this.
//!
//! Per record:
//!
//! 1. clone the stored fields;
//! 2. run every selected rule in order; a rule whose conditions all hold
//!    against the current clone applies all of its actions;
//! 3. re-validate and overwrite `_validationErrors` (validation always
//!    wins, so `mark_error` output never survives this step);
//! 4. diff touched fields against the stored record;
//! 5. a record carrying the deletion marker becomes a delete instead.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::action::execute;
use super::condition::evaluate_all;
use super::model::Rule;
use crate::entity::EntityKind;
use crate::record::{
    is_filtered_out, set_validation_errors, Fields, StoredRecord, VALIDATION_ERRORS_FIELD,
};
use crate::types::DbId;
use crate::validation::validate;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One entry of a per-kind bulk write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BulkOperation {
    /// Set the given top-level fields and remove the listed ones.
    Update {
        id: DbId,
        set: Fields,
        unset: Vec<String>,
    },
    Delete { id: DbId },
}

impl BulkOperation {
    pub fn id(&self) -> DbId {
        match self {
            Self::Update { id, .. } | Self::Delete { id } => *id,
        }
    }
}

/// Counts reported by a store after applying a bulk batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkWriteResult {
    pub modified_count: u64,
    pub deleted_count: u64,
}

/// Working state of one record after all rules ran and validation was
/// refreshed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPass {
    pub fields: Fields,
    /// Top-level fields written during the pass.
    pub touched: BTreeSet<String>,
}

/// The computed bulk batch for one entity kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindPlan {
    pub entity_type: EntityKind,
    pub operations: Vec<BulkOperation>,
    /// Records that needed no write.
    pub unchanged: usize,
}

impl KindPlan {
    pub fn update_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, BulkOperation::Update { .. }))
            .count()
    }

    pub fn delete_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, BulkOperation::Delete { .. }))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Enabled rules that apply to `kind`, highest priority first.
///
/// The sort is stable: equal priorities keep their stored order.
pub fn select_rules(rules: &[Rule], kind: EntityKind) -> Vec<&Rule> {
    let mut selected: Vec<&Rule> = rules
        .iter()
        .filter(|rule| rule.enabled && rule.entity_type.applies_to(kind))
        .collect();
    selected.sort_by_key(|rule| Reverse(rule.priority));
    selected
}

/// Run the selected rules over a copy of `original`, then re-validate.
pub fn apply_rules(kind: EntityKind, rules: &[&Rule], original: &Fields) -> RecordPass {
    let mut fields = original.clone();
    let mut touched = BTreeSet::new();

    for rule in rules {
        if !evaluate_all(&fields, &rule.conditions) {
            continue;
        }
        for action in &rule.actions {
            if let Some(field) = execute(&mut fields, action) {
                touched.insert(field);
            }
        }
    }

    let errors = validate(kind, &fields);
    set_validation_errors(&mut fields, errors);
    touched.insert(VALIDATION_ERRORS_FIELD.to_string());

    RecordPass { fields, touched }
}

/// Turn a finished pass into at most one bulk operation.
///
/// Returns `None` when nothing observable changed.
pub fn diff_record(id: DbId, original: &Fields, pass: &RecordPass) -> Option<BulkOperation> {
    if is_filtered_out(&pass.fields) {
        return Some(BulkOperation::Delete { id });
    }

    let mut set = Fields::new();
    let mut unset = Vec::new();

    for field in &pass.touched {
        let before = original.get(field).filter(|v| !v.is_null());
        match pass.fields.get(field) {
            None | Some(Value::Null) => {
                if before.is_some() {
                    unset.push(field.clone());
                }
            }
            Some(after) => {
                if before != Some(after) {
                    set.insert(field.clone(), after.clone());
                }
            }
        }
    }

    if set.is_empty() && unset.is_empty() {
        None
    } else {
        Some(BulkOperation::Update { id, set, unset })
    }
}

/// Plan the bulk batch for one kind's record snapshot.
pub fn plan_kind(kind: EntityKind, rules: &[Rule], records: &[StoredRecord]) -> KindPlan {
    let selected = select_rules(rules, kind);
    let mut operations = Vec::new();
    let mut unchanged = 0;

    for record in records {
        let pass = apply_rules(kind, &selected, &record.fields);
        match diff_record(record.id, &record.fields, &pass) {
            Some(op) => operations.push(op),
            None => unchanged += 1,
        }
    }

    KindPlan {
        entity_type: kind,
        operations,
        unchanged,
    }
}

/// Apply a plan to an in-memory snapshot, the way a store would.
///
/// Used for previews and by in-memory stores; mirrors the set / unset /
/// delete semantics of the database bulk write.
pub fn apply_operations(records: &mut Vec<StoredRecord>, operations: &[BulkOperation]) {
    for op in operations {
        match op {
            BulkOperation::Delete { id } => records.retain(|r| r.id != *id),
            BulkOperation::Update { id, set, unset } => {
                if let Some(record) = records.iter_mut().find(|r| r.id == *id) {
                    for field in unset {
                        record.fields.remove(field);
                    }
                    for (key, value) in set {
                        record.fields.insert(key.clone(), value.clone());
                    }
                }
            }
        }
    }
}
