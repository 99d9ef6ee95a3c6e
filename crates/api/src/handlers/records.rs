//! Handlers for the `/records` resource.
//!
//! Ingestion of already-parsed rows, dry-run validation, header
//! classification, and single-record maintenance. Every write path stores
//! the record's current validation errors alongside its fields.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use datarules_core::entity::EntityKind;
use datarules_core::error::CoreError;
use datarules_core::record::{set_validation_errors, validation_errors, Fields};
use datarules_core::types::DbId;
use datarules_core::validation::{classify_headers, validate};
use datarules_db::models::record::RecordView;
use datarules_db::repositories::RecordRepo;
use serde::{Deserialize, Serialize};

use super::parse_kind;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Record",
        id,
    })
}

/// Validate `fields` for `kind` and store the result in the reserved field.
fn with_validation(kind: EntityKind, mut fields: Fields) -> Fields {
    let errors = validate(kind, &fields);
    set_validation_errors(&mut fields, errors);
    fields
}

// ── Classification / Validation ──────────────────────────────────────

/// Request body for header classification.
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub headers: Vec<String>,
}

/// Response payload for header classification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub entity_type: Option<EntityKind>,
}

/// POST /api/v1/records/classify
///
/// Guess the entity kind of a sheet from its header row. `entityType` is
/// `null` when no kind's required headers are all present.
pub async fn classify(
    Json(body): Json<ClassifyRequest>,
) -> Json<DataResponse<Classification>> {
    let entity_type = classify_headers(body.headers.as_slice());
    Json(DataResponse {
        data: Classification { entity_type },
    })
}

/// Request body carrying parsed rows.
#[derive(Debug, Deserialize)]
pub struct RecordsRequest {
    pub records: Vec<Fields>,
}

/// Validation outcome of one input row.
#[derive(Debug, Serialize)]
pub struct RowValidation {
    pub index: usize,
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Response payload for dry-run validation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub entity_type: EntityKind,
    pub total: usize,
    pub invalid: usize,
    pub results: Vec<RowValidation>,
}

/// POST /api/v1/records/{entity_type}/validate
///
/// Validate rows without storing them. Returns one entry per input row,
/// in input order.
pub async fn validate_records(
    Path(entity_type): Path<String>,
    Json(body): Json<RecordsRequest>,
) -> AppResult<Json<DataResponse<ValidationReport>>> {
    let kind = parse_kind(&entity_type)?;
    let results: Vec<RowValidation> = body
        .records
        .iter()
        .enumerate()
        .map(|(index, fields)| {
            let errors = validate(kind, fields);
            RowValidation {
                index,
                valid: errors.is_empty(),
                errors,
            }
        })
        .collect();
    let invalid = results.iter().filter(|r| !r.valid).count();
    Ok(Json(DataResponse {
        data: ValidationReport {
            entity_type: kind,
            total: results.len(),
            invalid,
            results,
        },
    }))
}

// ── Record CRUD ──────────────────────────────────────────────────────

/// GET /api/v1/records/{entity_type}
pub async fn list_records(
    State(state): State<AppState>,
    Path(entity_type): Path<String>,
) -> AppResult<Json<DataResponse<Vec<RecordView>>>> {
    let kind = parse_kind(&entity_type)?;
    let rows = RecordRepo::list_by_entity_type(&state.pool, kind).await?;
    let records: Vec<RecordView> = rows.into_iter().map(RecordView::from).collect();
    Ok(Json(DataResponse { data: records }))
}

/// Response payload for ingestion.
#[derive(Debug, Serialize)]
pub struct IngestResult {
    pub inserted: usize,
    pub invalid: usize,
    pub records: Vec<RecordView>,
}

/// POST /api/v1/records/{entity_type}
///
/// Store a batch of parsed rows, each with its validation errors. Invalid
/// rows are stored too; they are counted in the response. Returns HTTP 201.
pub async fn ingest_records(
    State(state): State<AppState>,
    Path(entity_type): Path<String>,
    Json(body): Json<RecordsRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<IngestResult>>)> {
    let kind = parse_kind(&entity_type)?;
    if body.records.is_empty() {
        return Err(AppError::BadRequest(
            "records array must not be empty".to_string(),
        ));
    }

    let prepared: Vec<Fields> = body
        .records
        .into_iter()
        .map(|fields| with_validation(kind, fields))
        .collect();
    let invalid = prepared
        .iter()
        .filter(|fields| !validation_errors(fields).is_empty())
        .count();

    let rows = RecordRepo::create_many(&state.pool, kind, &prepared).await?;
    tracing::info!(entity_type = %kind, inserted = rows.len(), invalid, "Records ingested");

    let records: Vec<RecordView> = rows.into_iter().map(RecordView::from).collect();
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: IngestResult {
                inserted: records.len(),
                invalid,
                records,
            },
        }),
    ))
}

/// PUT /api/v1/records/{entity_type}/{id}
///
/// Replace a record's fields and re-validate it. Returns 404 if not found.
pub async fn update_record(
    State(state): State<AppState>,
    Path((entity_type, id)): Path<(String, DbId)>,
    Json(fields): Json<Fields>,
) -> AppResult<Json<DataResponse<RecordView>>> {
    let kind = parse_kind(&entity_type)?;
    let fields = with_validation(kind, fields);
    let row = RecordRepo::replace(&state.pool, kind, id, &fields)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::debug!(entity_type = %kind, record_id = id, "Record updated");
    Ok(Json(DataResponse {
        data: RecordView::from(row),
    }))
}

/// DELETE /api/v1/records/{entity_type}/{id}
///
/// Returns 204 on success, 404 if not found.
pub async fn delete_record(
    State(state): State<AppState>,
    Path((entity_type, id)): Path<(String, DbId)>,
) -> AppResult<StatusCode> {
    let kind = parse_kind(&entity_type)?;
    if RecordRepo::delete(&state.pool, kind, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datarules_core::record::VALIDATION_ERRORS_FIELD;
    use serde_json::{json, Value};

    #[test]
    fn with_validation_overwrites_stale_errors() {
        let fields = match json!({
            "TaskID": "T1",
            "Duration": 2,
            "MaxConcurrent": 1,
            "_validationErrors": ["Duration: stale."]
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let fields = with_validation(EntityKind::Tasks, fields);
        assert_eq!(fields[VALIDATION_ERRORS_FIELD], Value::Null);
    }
}
