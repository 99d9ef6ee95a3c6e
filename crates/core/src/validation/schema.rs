//! Per-kind schema checks.
//!
//! Each validator is a pure function of the record's current field values
//! and returns errors in a fixed field order, formatted `"<Field>: <message>."`.

use serde_json::Value;

use super::parsing::{
    is_json, is_present, parse_comma_separated, parse_integer, parse_phases, PhaseList,
};
use crate::entity::EntityKind;
use crate::record::Fields;

/// Field name reported when the entity type itself is not recognised.
pub const ENTITY_TYPE_FIELD: &str = "EntityType";

pub const PRIORITY_MIN: i64 = 1;
pub const PRIORITY_MAX: i64 = 5;
pub const DURATION_MIN: i64 = 1;

/// Format a single validation error.
pub fn field_error(field: &str, message: &str) -> String {
    format!("{field}: {message}.")
}

/// Validate a record against the schema of `kind`.
pub fn validate(kind: EntityKind, fields: &Fields) -> Vec<String> {
    let mut errors = Vec::new();
    match kind {
        EntityKind::Clients => validate_client(fields, &mut errors),
        EntityKind::Workers => validate_worker(fields, &mut errors),
        EntityKind::Tasks => validate_task(fields, &mut errors),
    }
    errors
}

/// Validate a record against a kind given by name.
///
/// An unrecognised name yields exactly one generic error and no per-field
/// checks.
pub fn validate_entity_type(entity_type: &str, fields: &Fields) -> Vec<String> {
    match EntityKind::from_str_value(entity_type) {
        Ok(kind) => validate(kind, fields),
        Err(_) => vec![field_error(
            ENTITY_TYPE_FIELD,
            &format!("Unknown entity type '{entity_type}'"),
        )],
    }
}

fn validate_client(fields: &Fields, errors: &mut Vec<String>) {
    require_id(fields, "ClientID", errors);

    match fields.get("PriorityLevel").and_then(parse_integer) {
        Some(level) if (PRIORITY_MIN..=PRIORITY_MAX).contains(&level) => {}
        _ => errors.push(field_error(
            "PriorityLevel",
            &format!("Must be an integer between {PRIORITY_MIN} and {PRIORITY_MAX}"),
        )),
    }

    check_comma_list(fields, "RequestedTaskIDs", "task IDs", errors);

    let attributes = fields.get("AttributesJSON");
    if is_present(attributes) {
        let valid = match attributes {
            Some(Value::String(text)) => is_json(text),
            Some(Value::Object(_)) => true,
            _ => false,
        };
        if !valid {
            errors.push(field_error("AttributesJSON", "Must be valid JSON"));
        }
    }
}

fn validate_worker(fields: &Fields, errors: &mut Vec<String>) {
    require_id(fields, "WorkerID", errors);
    check_comma_list(fields, "Skills", "skills", errors);
    check_phase_list(fields, "AvailableSlots", errors);
    require_integer(fields, "MaxLoadPerPhase", errors);
}

fn validate_task(fields: &Fields, errors: &mut Vec<String>) {
    require_id(fields, "TaskID", errors);

    match fields.get("Duration").and_then(parse_integer) {
        Some(duration) if duration >= DURATION_MIN => {}
        _ => errors.push(field_error(
            "Duration",
            &format!("Must be an integer of at least {DURATION_MIN}"),
        )),
    }

    check_comma_list(fields, "RequiredSkills", "skills", errors);
    check_phase_list(fields, "PreferredPhases", errors);
    require_integer(fields, "MaxConcurrent", errors);
}

// ── Field checks ─────────────────────────────────────────────────────

fn require_id(fields: &Fields, field: &str, errors: &mut Vec<String>) {
    let ok = matches!(fields.get(field), Some(Value::String(s)) if !s.trim().is_empty());
    if !ok {
        errors.push(field_error(field, "Must be a non-empty string"));
    }
}

fn require_integer(fields: &Fields, field: &str, errors: &mut Vec<String>) {
    if fields.get(field).and_then(parse_integer).is_none() {
        errors.push(field_error(field, "Must be an integer"));
    }
}

fn check_comma_list(fields: &Fields, field: &str, noun: &str, errors: &mut Vec<String>) {
    let value = fields.get(field);
    if !is_present(value) {
        return;
    }
    if value.map(parse_comma_separated).unwrap_or_default().is_empty() {
        errors.push(field_error(
            field,
            &format!("Must be a comma-separated list of {noun}"),
        ));
    }
}

fn check_phase_list(fields: &Fields, field: &str, errors: &mut Vec<String>) {
    match fields.get(field) {
        Some(value) if is_present(Some(value)) => {
            if parse_phases(value) == PhaseList::Malformed {
                errors.push(field_error(
                    field,
                    "Must be a phase list such as [1,2,3], 1-3 or 1,2,3",
                ));
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn has_error_for(errors: &[String], field: &str) -> bool {
        errors.iter().any(|e| e.starts_with(&format!("{field}:")))
    }

    // -- clients --

    #[test]
    fn valid_client_has_no_errors() {
        let r = record(json!({
            "ClientID": "C1",
            "PriorityLevel": 3,
            "RequestedTaskIDs": "T1,T2",
            "AttributesJSON": "{\"location\":\"NY\"}"
        }));
        assert!(validate(EntityKind::Clients, &r).is_empty());
    }

    #[test]
    fn priority_level_out_of_range() {
        let r = record(json!({"ClientID": "C1", "PriorityLevel": 0}));
        let errors = validate(EntityKind::Clients, &r);
        assert_eq!(
            errors,
            vec!["PriorityLevel: Must be an integer between 1 and 5.".to_string()]
        );

        let r = record(json!({"ClientID": "C1", "PriorityLevel": 3}));
        assert!(!has_error_for(&validate(EntityKind::Clients, &r), "PriorityLevel"));
    }

    #[test]
    fn priority_level_as_string() {
        let r = record(json!({"ClientID": "C1", "PriorityLevel": "5"}));
        assert!(validate(EntityKind::Clients, &r).is_empty());
        let r = record(json!({"ClientID": "C1", "PriorityLevel": "6"}));
        assert!(has_error_for(&validate(EntityKind::Clients, &r), "PriorityLevel"));
    }

    #[test]
    fn client_errors_are_ordered_by_field() {
        let r = record(json!({
            "ClientID": "",
            "RequestedTaskIDs": ",,",
            "AttributesJSON": "not json"
        }));
        let errors = validate(EntityKind::Clients, &r);
        let fields: Vec<&str> = errors
            .iter()
            .map(|e| e.split(':').next().unwrap())
            .collect();
        assert_eq!(
            fields,
            vec!["ClientID", "PriorityLevel", "RequestedTaskIDs", "AttributesJSON"]
        );
    }

    #[test]
    fn attributes_json_accepts_object() {
        let r = record(json!({
            "ClientID": "C1",
            "PriorityLevel": 1,
            "AttributesJSON": {"message": "hello"}
        }));
        assert!(validate(EntityKind::Clients, &r).is_empty());
    }

    #[test]
    fn empty_optional_fields_are_not_errors() {
        let r = record(json!({
            "ClientID": "C1",
            "PriorityLevel": 2,
            "RequestedTaskIDs": "",
            "AttributesJSON": null
        }));
        assert!(validate(EntityKind::Clients, &r).is_empty());
    }

    // -- workers --

    #[test]
    fn valid_worker() {
        let r = record(json!({
            "WorkerID": "W1",
            "Skills": "coding,ml",
            "AvailableSlots": "[1,3,5]",
            "MaxLoadPerPhase": "2"
        }));
        assert!(validate(EntityKind::Workers, &r).is_empty());
    }

    #[test]
    fn worker_malformed_slots_and_load() {
        let r = record(json!({
            "WorkerID": "W1",
            "AvailableSlots": "sometimes",
            "MaxLoadPerPhase": "lots"
        }));
        let errors = validate(EntityKind::Workers, &r);
        assert_eq!(errors.len(), 2);
        assert!(has_error_for(&errors, "AvailableSlots"));
        assert!(has_error_for(&errors, "MaxLoadPerPhase"));
    }

    #[test]
    fn worker_unbounded_slot_range_is_reported() {
        let r = record(json!({
            "WorkerID": "W1",
            "MaxLoadPerPhase": 1,
            "AvailableSlots": "1-9223372036854775807"
        }));
        let errors = validate(EntityKind::Workers, &r);
        assert_eq!(errors.len(), 1);
        assert!(has_error_for(&errors, "AvailableSlots"));
    }

    #[test]
    fn worker_max_load_has_no_range() {
        let r = record(json!({"WorkerID": "W1", "MaxLoadPerPhase": -4}));
        assert!(validate(EntityKind::Workers, &r).is_empty());
    }

    // -- tasks --

    #[test]
    fn valid_task() {
        let r = record(json!({
            "TaskID": "T1",
            "Duration": 2,
            "RequiredSkills": "ml",
            "PreferredPhases": "1-3",
            "MaxConcurrent": 1
        }));
        assert!(validate(EntityKind::Tasks, &r).is_empty());
    }

    #[test]
    fn task_duration_must_be_positive() {
        let r = record(json!({"TaskID": "T1", "Duration": 0, "MaxConcurrent": 1}));
        assert_eq!(
            validate(EntityKind::Tasks, &r),
            vec!["Duration: Must be an integer of at least 1.".to_string()]
        );
    }

    #[test]
    fn task_descending_phase_range_is_error() {
        let r = record(json!({
            "TaskID": "T1",
            "Duration": 1,
            "PreferredPhases": "5-3",
            "MaxConcurrent": 2
        }));
        let errors = validate(EntityKind::Tasks, &r);
        assert_eq!(errors.len(), 1);
        assert!(has_error_for(&errors, "PreferredPhases"));
    }

    // -- unknown --

    #[test]
    fn unknown_entity_type_yields_single_error() {
        let r = record(json!({"ClientID": ""}));
        let errors = validate_entity_type("vendors", &r);
        assert_eq!(
            errors,
            vec!["EntityType: Unknown entity type 'vendors'.".to_string()]
        );
    }

    #[test]
    fn known_entity_type_by_name() {
        let r = record(json!({"ClientID": "C1", "PriorityLevel": 9}));
        assert_eq!(validate_entity_type("clients", &r).len(), 1);
    }

    #[test]
    fn validation_does_not_mutate_input() {
        let r = record(json!({"ClientID": "C1"}));
        let before = r.clone();
        let _ = validate(EntityKind::Clients, &r);
        assert_eq!(r, before);
    }
}
