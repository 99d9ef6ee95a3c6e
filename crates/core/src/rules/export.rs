//! Rule document export / import.
//!
//! Exported documents are a JSON array of rules without any storage
//! identity, so an export can be imported into another dataset unchanged.

use serde_json::Value;

use super::model::Rule;
use crate::error::CoreError;

/// Storage-internal keys dropped from rule documents on import.
pub const IDENTITY_FIELDS: &[&str] = &[
    "id",
    "_id",
    "created_at",
    "updated_at",
    "createdAt",
    "updatedAt",
];

/// Serialize rules as a pretty-printed JSON array.
pub fn export_rules(rules: &[Rule]) -> Result<String, CoreError> {
    serde_json::to_string_pretty(rules)
        .map_err(|e| CoreError::Internal(format!("Failed to serialize rules: {e}")))
}

/// Parse exported rule text.
pub fn import_rules(text: &str) -> Result<Vec<Rule>, CoreError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CoreError::Validation(format!("Rule document is not valid JSON: {e}")))?;
    parse_rule_documents(value)
}

/// Parse one rule object or an array of them, dropping identity keys and
/// running structural checks on each rule.
pub fn parse_rule_documents(value: Value) -> Result<Vec<Rule>, CoreError> {
    let documents = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => {
            return Err(CoreError::Validation(
                "Rule document must be an object or an array of objects".to_string(),
            ))
        }
    };

    documents
        .into_iter()
        .enumerate()
        .map(|(index, document)| {
            let mut rule: Rule = serde_json::from_value(document)
                .map_err(|e| CoreError::Validation(format!("Rule #{index}: {e}")))?;
            rule.strip_identity();
            rule.check()
                .map_err(|e| CoreError::Validation(format!("Rule #{index}: {e}")))?;
            Ok(rule)
        })
        .collect()
}
