//! Schema-free records.
//!
//! A record is an ordered JSON object. Two field names are reserved: the
//! engine writes validation output to [`VALIDATION_ERRORS_FIELD`] and the
//! `filter_out` action writes the deletion marker to [`FILTERED_OUT_FIELD`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::DbId;

/// Ordered field map of a single record.
pub type Fields = serde_json::Map<String, Value>;

/// Reserved field holding the record's current validation errors.
pub const VALIDATION_ERRORS_FIELD: &str = "_validationErrors";

/// Reserved field marking a record for deletion.
pub const FILTERED_OUT_FIELD: &str = "_filteredOut";

/// A record together with its persistence-assigned identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: DbId,
    pub fields: Fields,
}

impl StoredRecord {
    pub fn new(id: DbId, fields: Fields) -> Self {
        Self { id, fields }
    }
}

/// Whether the record carries the deletion marker.
pub fn is_filtered_out(fields: &Fields) -> bool {
    matches!(fields.get(FILTERED_OUT_FIELD), Some(Value::Bool(true)))
}

/// Write validation output into the reserved field.
///
/// An empty error list is stored as `null` so that a clean record and a
/// record that was never validated diff the same way.
pub fn set_validation_errors(fields: &mut Fields, errors: Vec<String>) {
    let value = if errors.is_empty() {
        Value::Null
    } else {
        Value::Array(errors.into_iter().map(Value::String).collect())
    };
    fields.insert(VALIDATION_ERRORS_FIELD.to_string(), value);
}

/// Read the reserved validation field back as strings.
pub fn validation_errors(fields: &Fields) -> Vec<String> {
    match fields.get(VALIDATION_ERRORS_FIELD) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
