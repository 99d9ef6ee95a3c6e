//! Rule document types.
//!
//! These types are the persisted and exported JSON contract, so field names
//! follow the camelCase document shape rather than Rust conventions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::export::IDENTITY_FIELDS;
use crate::entity::EntityKind;
use crate::error::CoreError;
use crate::record::Fields;

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

pub const SCOPE_GENERAL: &str = "general";

/// Which records a rule targets. `General` rules apply to every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    Clients,
    Workers,
    Tasks,
    General,
}

impl RuleScope {
    pub fn applies_to(&self, kind: EntityKind) -> bool {
        match self {
            Self::General => true,
            scope => *scope == Self::from(kind),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clients => EntityKind::Clients.as_str(),
            Self::Workers => EntityKind::Workers.as_str(),
            Self::Tasks => EntityKind::Tasks.as_str(),
            Self::General => SCOPE_GENERAL,
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        if s == SCOPE_GENERAL {
            return Ok(Self::General);
        }
        EntityKind::from_str_value(s)
            .map(Self::from)
            .map_err(|_| format!("Invalid rule entity type '{s}'"))
    }
}

impl From<EntityKind> for RuleScope {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Clients => Self::Clients,
            EntityKind::Workers => Self::Workers,
            EntityKind::Tasks => Self::Tasks,
        }
    }
}

impl fmt::Display for RuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A conditional transformation: when every condition holds, every action
/// runs in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub entity_type: RuleScope,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Higher runs first.
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Document keys with no meaning to the engine, kept for round trips.
    #[serde(flatten)]
    pub extra: Fields,
}

fn default_enabled() -> bool {
    true
}

impl Rule {
    /// Structural checks beyond what deserialization enforces.
    pub fn check(&self) -> Result<(), CoreError> {
        if let Some(condition) = self.conditions.iter().find(|c| c.field.trim().is_empty()) {
            return Err(CoreError::InvalidRule(format!(
                "condition with operator '{}' has an empty field path",
                condition.operator
            )));
        }
        if let Some(action) = self
            .actions
            .iter()
            .find(|a| a.requires_field() && a.field().trim().is_empty())
        {
            return Err(CoreError::InvalidRule(format!(
                "action '{}' has an empty field path",
                action.type_name()
            )));
        }
        Ok(())
    }

    /// Drop storage identity keys that arrived with the document.
    pub fn strip_identity(&mut self) {
        for key in IDENTITY_FIELDS {
            self.extra.remove(*key);
        }
    }
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// A single predicate over one (possibly nested) field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    /// `None` when the document has no `value` key; evaluated as `null`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    /// Advisory declared kind of `value`; not used during evaluation.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value),
            value_type: None,
            extra: Fields::new(),
        }
    }
}

/// Comparison operators.
///
/// Unrecognised operator strings are kept verbatim so that documents
/// round-trip; such conditions never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
    In,
    Nin,
    Exists,
    IsString,
    IsNotJson,
    Unknown(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::In => "in",
            Self::Nin => "nin",
            Self::Exists => "exists",
            Self::IsString => "is_string",
            Self::IsNotJson => "is_not_json",
            Self::Unknown(other) => other.as_str(),
        }
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        match s.as_str() {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "gt" => Self::Gt,
            "lt" => Self::Lt,
            "gte" => Self::Gte,
            "lte" => Self::Lte,
            "contains" => Self::Contains,
            "startsWith" => Self::StartsWith,
            "endsWith" => Self::EndsWith,
            "in" => Self::In,
            "nin" => Self::Nin,
            "exists" => Self::Exists,
            "is_string" => Self::IsString,
            "is_not_json" => Self::IsNotJson,
            _ => Self::Unknown(s),
        }
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A mutation applied to a matching record.
///
/// `value` distinguishes an explicit `null` (`Some(Value::Null)`) from an
/// absent key (`None`). Keys a variant does not use land in `extra` so that
/// exported documents match what was imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    SetField {
        field: String,
        #[serde(
            default,
            deserialize_with = "deserialize_present",
            skip_serializing_if = "Option::is_none"
        )]
        value: Option<Value>,
        #[serde(flatten)]
        extra: Fields,
    },
    MarkError {
        field: String,
        #[serde(
            default,
            deserialize_with = "deserialize_present",
            skip_serializing_if = "Option::is_none"
        )]
        value: Option<Value>,
        #[serde(flatten)]
        extra: Fields,
    },
    /// Declared for document compatibility; has no effect.
    TransformValue {
        field: String,
        #[serde(
            default,
            deserialize_with = "deserialize_present",
            skip_serializing_if = "Option::is_none"
        )]
        value: Option<Value>,
        #[serde(flatten)]
        extra: Fields,
    },
    FilterOut {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        field: String,
        #[serde(flatten)]
        extra: Fields,
    },
    WrapStringInJsonMessage {
        field: String,
        #[serde(
            rename = "additionalFields",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        additional_fields: Option<Fields>,
        #[serde(flatten)]
        extra: Fields,
    },
}

impl Action {
    pub fn field(&self) -> &str {
        match self {
            Self::SetField { field, .. }
            | Self::MarkError { field, .. }
            | Self::TransformValue { field, .. }
            | Self::FilterOut { field, .. }
            | Self::WrapStringInJsonMessage { field, .. } => field,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SetField { .. } => "set_field",
            Self::MarkError { .. } => "mark_error",
            Self::TransformValue { .. } => "transform_value",
            Self::FilterOut { .. } => "filter_out",
            Self::WrapStringInJsonMessage { .. } => "wrap_string_in_json_message",
        }
    }

    fn requires_field(&self) -> bool {
        !matches!(self, Self::FilterOut { .. })
    }
}

/// Deserialize a present key (including `null`) as `Some`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn scope_applies_to_matching_kind_and_general() {
        assert!(RuleScope::Clients.applies_to(EntityKind::Clients));
        assert!(!RuleScope::Clients.applies_to(EntityKind::Tasks));
        for kind in EntityKind::ALL {
            assert!(RuleScope::General.applies_to(kind));
        }
    }

    #[test]
    fn scope_from_string() {
        assert_eq!(RuleScope::from_str_value("general"), Ok(RuleScope::General));
        assert_eq!(RuleScope::from_str_value("tasks"), Ok(RuleScope::Tasks));
        assert!(RuleScope::from_str_value("people").is_err());
    }

    #[test]
    fn rule_defaults() {
        let rule: Rule = serde_json::from_value(json!({"entityType": "workers"})).unwrap();
        assert!(rule.enabled);
        assert_eq!(rule.priority, 0);
        assert!(rule.conditions.is_empty());
        assert!(rule.actions.is_empty());
    }

    #[test]
    fn parses_full_document() {
        let rule: Rule = serde_json::from_value(json!({
            "name": "Escalate VIPs",
            "entityType": "clients",
            "enabled": true,
            "priority": 10,
            "conditions": [
                {"field": "GroupTag", "operator": "eq", "value": "VIP", "type": "string"}
            ],
            "actions": [
                {"type": "set_field", "field": "PriorityLevel", "value": 5},
                {"type": "wrap_string_in_json_message", "field": "AttributesJSON",
                 "additionalFields": {"source": "rule"}}
            ]
        }))
        .unwrap();

        assert_eq!(rule.conditions[0].operator, Operator::Eq);
        assert_eq!(rule.conditions[0].value_type.as_deref(), Some("string"));
        assert_matches!(&rule.actions[0], Action::SetField { value: Some(v), .. } if *v == json!(5));
        assert_matches!(
            &rule.actions[1],
            Action::WrapStringInJsonMessage { additional_fields: Some(extra), .. }
                if extra["source"] == json!("rule")
        );
    }

    #[test]
    fn explicit_null_value_is_kept() {
        let action: Action =
            serde_json::from_value(json!({"type": "set_field", "field": "x", "value": null}))
                .unwrap();
        assert_eq!(
            action,
            Action::SetField {
                field: "x".into(),
                value: Some(Value::Null),
                extra: Fields::new(),
            }
        );
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"type": "set_field", "field": "x", "value": null})
        );

        let absent: Action =
            serde_json::from_value(json!({"type": "set_field", "field": "x"})).unwrap();
        assert_matches!(absent, Action::SetField { value: None, .. });
    }

    #[test]
    fn unknown_operator_round_trips() {
        let condition: Condition =
            serde_json::from_value(json!({"field": "a", "operator": "matches", "value": "x"}))
                .unwrap();
        assert_eq!(condition.operator, Operator::Unknown("matches".into()));
        assert_eq!(serde_json::to_value(&condition).unwrap()["operator"], "matches");
    }

    #[test]
    fn absent_condition_value_stays_absent() {
        let condition: Condition =
            serde_json::from_value(json!({"field": "ClientID", "operator": "exists"})).unwrap();
        assert_eq!(condition.value, None);
        assert_eq!(
            serde_json::to_value(&condition).unwrap(),
            json!({"field": "ClientID", "operator": "exists"})
        );
    }

    #[test]
    fn unused_action_keys_are_kept() {
        let doc = json!({"type": "filter_out", "field": "ClientID", "value": true});
        let action: Action = serde_json::from_value(doc.clone()).unwrap();
        assert_matches!(&action, Action::FilterOut { extra, .. } if extra["value"] == json!(true));
        assert_eq!(serde_json::to_value(&action).unwrap(), doc);

        let doc = json!({"type": "wrap_string_in_json_message", "field": "Note", "value": "x"});
        let action: Action = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(serde_json::to_value(&action).unwrap(), doc);
    }

    #[test]
    fn strip_identity_keeps_other_extra_keys() {
        let mut rule: Rule = serde_json::from_value(json!({
            "entityType": "tasks",
            "id": 4,
            "createdAt": "2024-01-01T00:00:00Z",
            "owner": "ops"
        }))
        .unwrap();
        rule.strip_identity();
        assert_eq!(serde_json::to_value(&rule.extra).unwrap(), json!({"owner": "ops"}));
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        let result: Result<Action, _> =
            serde_json::from_value(json!({"type": "explode", "field": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn check_rejects_empty_paths() {
        let rule: Rule = serde_json::from_value(json!({
            "entityType": "tasks",
            "actions": [{"type": "set_field", "field": " ", "value": 1}]
        }))
        .unwrap();
        assert_matches!(rule.check(), Err(CoreError::InvalidRule(_)));

        let rule: Rule = serde_json::from_value(json!({
            "entityType": "tasks",
            "actions": [{"type": "filter_out"}]
        }))
        .unwrap();
        assert!(rule.check().is_ok());
    }
}
