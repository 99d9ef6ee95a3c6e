//! Handlers for the `/rules` resource.
//!
//! Provides rule CRUD, JSON export/import of rule documents, and the
//! apply endpoint that runs the engine over stored records.

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use datarules_core::entity::EntityKind;
use datarules_core::error::CoreError;
use datarules_core::rules::export::{export_rules, import_rules};
use datarules_core::rules::{BulkOperation, Rule, RuleScope};
use datarules_core::types::DbId;
use datarules_db::models::rule::{RuleColumns, RuleRow, RuleView, UpdateRuleState};
use datarules_db::repositories::RuleRepo;
use serde::{Deserialize, Serialize};

use super::parse_kind;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Rule", id })
}

fn views(rows: &[RuleRow]) -> AppResult<Vec<RuleView>> {
    Ok(rows
        .iter()
        .map(RuleView::from_row)
        .collect::<Result<Vec<_>, _>>()?)
}

// ── Rule CRUD ────────────────────────────────────────────────────────

/// Query parameters for listing rules.
#[derive(Debug, Deserialize)]
pub struct ListRulesParams {
    pub entity_type: Option<String>,
}

/// GET /api/v1/rules?entity_type=X
///
/// List stored rules in stored order, optionally restricted to one scope
/// (`clients`, `workers`, `tasks` or `general`).
pub async fn list_rules(
    State(state): State<AppState>,
    Query(params): Query<ListRulesParams>,
) -> AppResult<Json<DataResponse<Vec<RuleView>>>> {
    let scope = params
        .entity_type
        .as_deref()
        .map(RuleScope::from_str_value)
        .transpose()
        .map_err(AppError::BadRequest)?;
    let rows = RuleRepo::list(&state.pool, scope).await?;
    Ok(Json(DataResponse { data: views(&rows)? }))
}

/// POST /api/v1/rules
///
/// Create a rule from a rule document. Identity fields in the body are
/// ignored. Returns the stored rule with HTTP 201.
pub async fn create_rule(
    State(state): State<AppState>,
    Json(mut rule): Json<Rule>,
) -> AppResult<(StatusCode, Json<DataResponse<RuleView>>)> {
    rule.check()?;
    rule.strip_identity();
    let row = RuleRepo::create(&state.pool, &RuleColumns::from_rule(&rule)?).await?;
    tracing::info!(rule_id = row.id, entity_type = %rule.entity_type, "Rule created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RuleView::from_row(&row)?,
        }),
    ))
}

/// GET /api/v1/rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RuleView>>> {
    let row = RuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: RuleView::from_row(&row)?,
    }))
}

/// PUT /api/v1/rules/{id}
///
/// Replace the whole rule document. Returns 404 if not found.
pub async fn replace_rule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut rule): Json<Rule>,
) -> AppResult<Json<DataResponse<RuleView>>> {
    rule.check()?;
    rule.strip_identity();
    let row = RuleRepo::replace(&state.pool, id, &RuleColumns::from_rule(&rule)?)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: RuleView::from_row(&row)?,
    }))
}

/// PATCH /api/v1/rules/{id}
///
/// Toggle `enabled` and/or change `priority`. Returns 404 if not found.
pub async fn update_rule_state(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRuleState>,
) -> AppResult<Json<DataResponse<RuleView>>> {
    let row = RuleRepo::update_state(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: RuleView::from_row(&row)?,
    }))
}

/// DELETE /api/v1/rules/{id}
///
/// Returns 204 on success, 404 if not found.
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if RuleRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

// ── Export / Import ──────────────────────────────────────────────────

/// GET /api/v1/rules/export
///
/// Every stored rule as a bare JSON array of rule documents, without
/// storage identity. Not wrapped in the `data` envelope so the body can be
/// saved and re-imported as is.
pub async fn export(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let rows = RuleRepo::list_all(&state.pool).await?;
    let rules = rows
        .iter()
        .map(RuleRow::to_rule)
        .collect::<Result<Vec<_>, _>>()?;
    let body = export_rules(&rules)?;
    Ok(([(CONTENT_TYPE, "application/json")], body))
}

/// Query parameters for importing rules.
#[derive(Debug, Deserialize)]
pub struct ImportParams {
    /// Delete existing rules before inserting the imported ones.
    #[serde(default)]
    pub replace: bool,
}

/// POST /api/v1/rules/import?replace=true
///
/// Accepts a single rule document or an array of them (such as the body
/// of an export). Identity fields are ignored. All documents are checked
/// before anything is written; the insert is atomic.
pub async fn import(
    State(state): State<AppState>,
    Query(params): Query<ImportParams>,
    body: String,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<RuleView>>>)> {
    let rules = import_rules(&body)?;
    let columns = rules
        .iter()
        .map(RuleColumns::from_rule)
        .collect::<Result<Vec<_>, _>>()?;
    let rows = RuleRepo::create_many(&state.pool, &columns, params.replace).await?;
    tracing::info!(count = rows.len(), replace = params.replace, "Rules imported");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: views(&rows)?,
        }),
    ))
}

// ── Apply ────────────────────────────────────────────────────────────

/// Request body for the apply endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    /// Kinds to process; all kinds when omitted.
    #[serde(default)]
    pub entity_types: Option<Vec<String>>,
    /// Compute the per-kind batches without writing them.
    #[serde(default)]
    pub dry_run: bool,
}

/// Resolve the requested kinds, defaulting to all of them.
fn requested_kinds(request: &ApplyRequest) -> AppResult<Vec<EntityKind>> {
    match &request.entity_types {
        None => Ok(EntityKind::ALL.to_vec()),
        Some(names) if names.is_empty() => Err(AppError::BadRequest(
            "entityTypes must not be empty".to_string(),
        )),
        Some(names) => {
            let mut kinds = Vec::with_capacity(names.len());
            for name in names {
                let kind = parse_kind(name)?;
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            Ok(kinds)
        }
    }
}

/// Per-kind entry of an apply response. A failed kind carries `error`
/// instead of its counts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindApplyResult<T: Serialize> {
    pub entity_type: EntityKind,
    pub ok: bool,
    #[serde(flatten)]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> KindApplyResult<T> {
    fn from_outcome<E: std::fmt::Display>(
        entity_type: EntityKind,
        outcome: Result<T, E>,
    ) -> Self {
        match outcome {
            Ok(result) => Self {
                entity_type,
                ok: true,
                result: Some(result),
                error: None,
            },
            Err(e) => Self {
                entity_type,
                ok: false,
                result: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Batch a dry run would write for one kind.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedChanges {
    pub updates: usize,
    pub deletes: usize,
    pub unchanged: usize,
    pub operations: Vec<BulkOperation>,
}

/// Counts reported by the store after writing one kind's batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedChanges {
    pub modified_count: u64,
    pub deleted_count: u64,
}

/// POST /api/v1/rules/apply
///
/// Run every enabled rule over the stored records of the requested kinds.
/// Kinds run concurrently and report independently: one kind failing
/// does not fail the request.
pub async fn apply(
    State(state): State<AppState>,
    Json(request): Json<ApplyRequest>,
) -> AppResult<impl IntoResponse> {
    let kinds = requested_kinds(&request)?;
    let runner = state.runner();

    if request.dry_run {
        let plans = futures::future::join_all(kinds.iter().map(|&kind| runner.plan(kind))).await;
        let data: Vec<KindApplyResult<PlannedChanges>> = kinds
            .iter()
            .zip(plans)
            .map(|(&kind, plan)| {
                let planned = plan.map(|plan| PlannedChanges {
                    updates: plan.update_count(),
                    deletes: plan.delete_count(),
                    unchanged: plan.unchanged,
                    operations: plan.operations,
                });
                KindApplyResult::from_outcome(kind, planned)
            })
            .collect();
        return Ok(Json(DataResponse { data }).into_response());
    }

    let reports = runner.run_all(&kinds).await;
    let data: Vec<KindApplyResult<AppliedChanges>> = reports
        .into_iter()
        .map(|report| {
            let applied = report.outcome.map(|summary| AppliedChanges {
                modified_count: summary.modified_count,
                deleted_count: summary.deleted_count,
            });
            KindApplyResult::from_outcome(report.entity_type, applied)
        })
        .collect();
    Ok(Json(DataResponse { data }).into_response())
}
