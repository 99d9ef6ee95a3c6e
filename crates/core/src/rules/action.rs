//! Action executor.
//!
//! Each action mutates the engine's working copy of a record in place and
//! reports the top-level field it touched, which the engine later diffs
//! against the stored record.

use serde_json::Value;

use super::model::Action;
use crate::path::{get_path, set_path, top_level_field};
use crate::record::{Fields, FILTERED_OUT_FIELD, VALIDATION_ERRORS_FIELD};
use crate::validation::parsing::is_json;

/// Key under which `wrap_string_in_json_message` stores the original text.
pub const WRAPPED_MESSAGE_KEY: &str = "message";

/// Apply `action` to `fields`. Returns the touched top-level field, if any.
pub fn execute(fields: &mut Fields, action: &Action) -> Option<String> {
    match action {
        Action::SetField { field, value, .. } => {
            set_path(fields, field, value.clone().unwrap_or(Value::Null));
            Some(top_level_field(field).to_string())
        }
        Action::MarkError { field, value, .. } => {
            push_error(fields, mark_error_text(field, value.as_ref()));
            Some(VALIDATION_ERRORS_FIELD.to_string())
        }
        Action::FilterOut { .. } => {
            fields.insert(FILTERED_OUT_FIELD.to_string(), Value::Bool(true));
            Some(FILTERED_OUT_FIELD.to_string())
        }
        Action::WrapStringInJsonMessage {
            field,
            additional_fields,
            ..
        } => wrap_string(fields, field, additional_fields.as_ref()),
        Action::TransformValue { .. } => None,
    }
}

fn mark_error_text(field: &str, value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => format!("{field}: {text}"),
        Some(other) => format!("{field}: {other}"),
        None => field.to_string(),
    }
}

fn push_error(fields: &mut Fields, text: String) {
    match fields.get_mut(VALIDATION_ERRORS_FIELD) {
        Some(Value::Array(errors)) => errors.push(Value::String(text)),
        _ => {
            fields.insert(
                VALIDATION_ERRORS_FIELD.to_string(),
                Value::Array(vec![Value::String(text)]),
            );
        }
    }
}

/// Replace a plain-text string with `{ "message": text, ...additional }`.
///
/// Values that are already JSON text, or not strings at all, are left
/// alone, so applying the action twice is the same as applying it once.
fn wrap_string(fields: &mut Fields, field: &str, additional: Option<&Fields>) -> Option<String> {
    let text = match get_path(fields, field) {
        Some(Value::String(text)) if !is_json(text) => text.clone(),
        _ => return None,
    };

    let mut wrapped = Fields::new();
    wrapped.insert(WRAPPED_MESSAGE_KEY.to_string(), Value::String(text));
    for (key, value) in additional.into_iter().flatten() {
        wrapped.insert(key.clone(), value.clone());
    }

    set_path(fields, field, Value::Object(wrapped));
    Some(top_level_field(field).to_string())
}
