//! Route definitions for the `/records` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::records;
use crate::state::AppState;

/// Routes mounted at `/records`.
///
/// ```text
/// POST   /classify                -> classify
/// GET    /{entity_type}           -> list_records
/// POST   /{entity_type}           -> ingest_records
/// POST   /{entity_type}/validate  -> validate_records
/// PUT    /{entity_type}/{id}      -> update_record
/// DELETE /{entity_type}/{id}      -> delete_record
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/classify", post(records::classify))
        .route(
            "/{entity_type}",
            get(records::list_records).post(records::ingest_records),
        )
        .route("/{entity_type}/validate", post(records::validate_records))
        .route(
            "/{entity_type}/{id}",
            put(records::update_record).delete(records::delete_record),
        )
}
