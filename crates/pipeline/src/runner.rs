//! Per-kind rule runs.

use datarules_core::entity::EntityKind;
use datarules_core::rules::{plan_kind, KindPlan};
use futures::future::join_all;
use serde::Serialize;

use crate::error::{PipelineError, StoreError};
use crate::store::RecordStore;

/// Outcome of a successful run over one kind, as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySummary {
    pub entity_type: EntityKind,
    pub modified_count: u64,
    pub deleted_count: u64,
}

/// Result of one kind inside a multi-kind run.
#[derive(Debug)]
pub struct KindReport {
    pub entity_type: EntityKind,
    pub outcome: Result<ApplySummary, PipelineError>,
}

/// Drives the planner against a [`RecordStore`].
pub struct RuleRunner<S> {
    store: S,
}

impl<S: RecordStore> RuleRunner<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compute the batch for `kind` without writing it.
    pub async fn plan(&self, kind: EntityKind) -> Result<KindPlan, PipelineError> {
        let wrap = |source: StoreError| PipelineError::Store {
            entity_type: kind,
            source,
        };
        let rules = self.store.load_rules().await.map_err(wrap)?;
        let records = self.store.load_records(kind).await.map_err(wrap)?;
        Ok(plan_kind(kind, &rules, &records))
    }

    /// Apply every enabled rule to every record of `kind` and persist the
    /// result as one bulk write.
    pub async fn run_kind(&self, kind: EntityKind) -> Result<ApplySummary, PipelineError> {
        let plan = self.plan(kind).await?;

        tracing::debug!(
            entity_type = %kind,
            updates = plan.update_count(),
            deletes = plan.delete_count(),
            unchanged = plan.unchanged,
            "Planned rule application",
        );

        let written = self
            .store
            .bulk_write(kind, &plan.operations)
            .await
            .map_err(|source| PipelineError::Store {
                entity_type: kind,
                source,
            })?;

        let summary = ApplySummary {
            entity_type: kind,
            modified_count: written.modified_count,
            deleted_count: written.deleted_count,
        };
        tracing::info!(
            entity_type = %kind,
            modified = summary.modified_count,
            deleted = summary.deleted_count,
            "Rules applied",
        );
        Ok(summary)
    }

    /// Run several kinds concurrently. A failing kind is reported in its
    /// own entry and does not affect the others.
    pub async fn run_all(&self, kinds: &[EntityKind]) -> Vec<KindReport> {
        let runs = kinds.iter().map(|&kind| async move {
            let outcome = self.run_kind(kind).await;
            if let Err(e) = &outcome {
                tracing::error!(entity_type = %kind, error = %e, "Rule application failed");
            }
            KindReport {
                entity_type: kind,
                outcome,
            }
        });
        join_all(runs).await
    }
}
