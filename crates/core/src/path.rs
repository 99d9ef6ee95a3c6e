//! Dot-separated nested path access into record fields.
//!
//! `"AttributesJSON.meta.level"` addresses `fields["AttributesJSON"]["meta"]["level"]`.
//! Reads are total: any missing or non-container segment yields `None`.
//! Writes create the path, replacing any non-object value met mid-path with
//! an empty object.

use serde_json::Value;

use crate::record::Fields;

/// The top-level field a path lands in (the part before the first dot).
pub fn top_level_field(path: &str) -> &str {
    path.split_once('.').map_or(path, |(head, _)| head)
}

/// Resolve `path` inside `fields`.
///
/// Array elements can be addressed by numeric segment (`"tags.0"`).
pub fn get_path<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write `value` at `path`, creating intermediate objects as needed.
pub fn set_path(fields: &mut Fields, path: &str, value: Value) {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut current = fields;
    if let Some(parents) = parents {
        for segment in parents.split('.') {
            let slot = current.entry(segment.to_string()).or_insert(Value::Null);
            current = ensure_object(slot);
        }
    }
    current.insert(leaf.to_string(), value);
}

fn ensure_object(slot: &mut Value) -> &mut Fields {
    if !slot.is_object() {
        *slot = Value::Object(Fields::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced with an object"),
    }
}
