//! Entity kinds: the three record collections the service manages.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const ENTITY_CLIENTS: &str = "clients";
pub const ENTITY_WORKERS: &str = "workers";
pub const ENTITY_TASKS: &str = "tasks";

/// All valid entity type strings, in classification priority order.
pub const VALID_ENTITY_TYPES: &[&str] = &[ENTITY_CLIENTS, ENTITY_WORKERS, ENTITY_TASKS];

/// The kind of a record. Determines which schema validates it and which
/// rules apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Clients,
    Workers,
    Tasks,
}

impl EntityKind {
    /// Every kind, in classification priority order.
    pub const ALL: [EntityKind; 3] = [Self::Clients, Self::Workers, Self::Tasks];

    /// Convert from a stored / path string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            ENTITY_CLIENTS => Ok(Self::Clients),
            ENTITY_WORKERS => Ok(Self::Workers),
            ENTITY_TASKS => Ok(Self::Tasks),
            _ => Err(format!(
                "Invalid entity type '{s}'. Must be one of: {}",
                VALID_ENTITY_TYPES.join(", ")
            )),
        }
    }

    /// Convert to the stored string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clients => ENTITY_CLIENTS,
            Self::Workers => ENTITY_WORKERS,
            Self::Tasks => ENTITY_TASKS,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_values_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_str_value(kind.as_str()), Ok(kind));
        }
    }

    #[test]
    fn rejects_unknown_and_general() {
        assert!(EntityKind::from_str_value("general").is_err());
        assert!(EntityKind::from_str_value("Clients").is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(EntityKind::Workers).unwrap(),
            serde_json::json!("workers")
        );
    }
}
