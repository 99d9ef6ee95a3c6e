//! Models for stored rules.

use datarules_core::error::CoreError;
use datarules_core::record::Fields;
use datarules_core::rules::{Action, Condition, Rule, RuleScope};
use datarules_core::types::DbId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::Timestamp;

/// A row from the `rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RuleRow {
    pub id: DbId,
    pub entity_type: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
    pub priority: i64,
    pub conditions: Value,
    pub actions: Value,
    pub extra: Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RuleRow {
    /// Decode the stored document into the engine's rule type.
    pub fn to_rule(&self) -> Result<Rule, CoreError> {
        let entity_type = RuleScope::from_str_value(&self.entity_type)
            .map_err(|e| CoreError::InvalidRule(format!("rule {}: {e}", self.id)))?;
        let conditions: Vec<Condition> = serde_json::from_value(self.conditions.clone())
            .map_err(|e| CoreError::InvalidRule(format!("rule {} conditions: {e}", self.id)))?;
        let actions: Vec<Action> = serde_json::from_value(self.actions.clone())
            .map_err(|e| CoreError::InvalidRule(format!("rule {} actions: {e}", self.id)))?;
        let extra: Fields = serde_json::from_value(self.extra.clone())
            .map_err(|e| CoreError::InvalidRule(format!("rule {} extra: {e}", self.id)))?;

        Ok(Rule {
            name: self.name.clone(),
            description: self.description.clone(),
            entity_type,
            enabled: self.enabled,
            priority: self.priority,
            conditions,
            actions,
            extra,
        })
    }
}

/// Bind-ready column values for inserting or replacing a rule.
#[derive(Debug, Clone)]
pub struct RuleColumns {
    pub entity_type: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
    pub priority: i64,
    pub conditions: Value,
    pub actions: Value,
    pub extra: Value,
}

impl RuleColumns {
    pub fn from_rule(rule: &Rule) -> Result<Self, CoreError> {
        let encode = |v: serde_json::Result<Value>| {
            v.map_err(|e| CoreError::Internal(format!("encode rule: {e}")))
        };
        Ok(Self {
            entity_type: rule.entity_type.as_str().to_string(),
            name: rule.name.clone(),
            description: rule.description.clone(),
            enabled: rule.enabled,
            priority: rule.priority,
            conditions: encode(serde_json::to_value(&rule.conditions))?,
            actions: encode(serde_json::to_value(&rule.actions))?,
            extra: Value::Object(rule.extra.clone()),
        })
    }
}

/// DTO for toggling a rule or changing its priority. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRuleState {
    pub enabled: Option<bool>,
    pub priority: Option<i64>,
}

/// API shape of a stored rule: the document plus its identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleView {
    pub id: DbId,
    #[serde(flatten)]
    pub rule: Rule,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RuleView {
    pub fn from_row(row: &RuleRow) -> Result<Self, CoreError> {
        Ok(Self {
            id: row.id,
            rule: row.to_rule()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
