//! Models for ingested records.

use datarules_core::record::{Fields, StoredRecord};
use datarules_core::types::DbId;
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use crate::Timestamp;

/// A row from the `records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecordRow {
    pub id: DbId,
    pub entity_type: String,
    pub data: Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RecordRow {
    /// The table constrains `data` to objects, so any other shape maps to an
    /// empty record.
    pub fn into_stored(self) -> StoredRecord {
        let fields = match self.data {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        StoredRecord::new(self.id, fields)
    }
}

/// API shape of a record: its fields flattened next to the id.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub id: DbId,
    #[serde(flatten)]
    pub fields: Fields,
}

impl From<RecordRow> for RecordView {
    fn from(row: RecordRow) -> Self {
        let stored = row.into_stored();
        Self {
            id: stored.id,
            fields: stored.fields,
        }
    }
}
