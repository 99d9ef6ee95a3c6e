use datarules_core::entity::EntityKind;
use datarules_core::error::CoreError;

/// Failure reported by a [`RecordStore`](crate::RecordStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored rule is invalid: {0}")]
    InvalidRule(#[from] CoreError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a rule run for one entity kind.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to apply rules to {entity_type}: {source}")]
    Store {
        entity_type: EntityKind,
        #[source]
        source: StoreError,
    },
}

impl PipelineError {
    pub fn entity_type(&self) -> EntityKind {
        match self {
            Self::Store { entity_type, .. } => *entity_type,
        }
    }
}
