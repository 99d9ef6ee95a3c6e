//! One-shot rule application over stored records.
//!
//! The binary loads [`WorkerConfig`], opens the pool, runs every enabled
//! rule over the configured kinds once, and exits non-zero if any kind
//! failed.

use datarules_core::entity::EntityKind;
use datarules_pipeline::{ApplySummary, KindReport, RecordStore, RuleRunner};

/// Worker configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    pub database_url: String,
    /// Kinds to process, in order (default: all kinds).
    pub entity_types: Vec<EntityKind>,
    pub db_max_connections: u32,
}

impl WorkerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var              | Default                   |
    /// |----------------------|---------------------------|
    /// | `DATABASE_URL`       | required                  |
    /// | `ENTITY_TYPES`       | `clients,workers,tasks`   |
    /// | `DB_MAX_CONNECTIONS` | `20`                      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let entity_types = match lookup("ENTITY_TYPES") {
            Some(raw) if !raw.trim().is_empty() => parse_entity_types(&raw)?,
            _ => EntityKind::ALL.to_vec(),
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                message: format!("{e}"),
            })?,
            None => datarules_db::DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            entity_types,
            db_max_connections,
        })
    }
}

fn parse_entity_types(raw: &str) -> Result<Vec<EntityKind>, ConfigError> {
    let mut kinds = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind = EntityKind::from_str_value(name).map_err(|message| ConfigError::Invalid {
            name: "ENTITY_TYPES",
            message,
        })?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

/// Totals over one worker run.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub succeeded: Vec<ApplySummary>,
    pub failed: Vec<KindReport>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn modified(&self) -> u64 {
        self.succeeded.iter().map(|s| s.modified_count).sum()
    }

    pub fn deleted(&self) -> u64 {
        self.succeeded.iter().map(|s| s.deleted_count).sum()
    }
}

/// Run the rules over `kinds` once and split the reports.
pub async fn run<S: RecordStore>(runner: &RuleRunner<S>, kinds: &[EntityKind]) -> RunOutcome {
    let mut outcome = RunOutcome::default();
    for report in runner.run_all(kinds).await {
        match report.outcome {
            Ok(summary) => outcome.succeeded.push(summary),
            Err(_) => outcome.failed.push(report),
        }
    }
    outcome
}
