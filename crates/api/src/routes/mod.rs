pub mod health;
pub mod records;
pub mod rules;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /rules                                   list, create
/// /rules/export                            export documents (GET)
/// /rules/import                            import documents (POST, ?replace)
/// /rules/apply                             run the engine (POST)
/// /rules/{id}                              get, replace, toggle, delete
///
/// /records/classify                        classify a header row (POST)
/// /records/{entity_type}                   list, ingest
/// /records/{entity_type}/validate          dry-run validation (POST)
/// /records/{entity_type}/{id}              replace, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/rules", rules::router())
        .nest("/records", records::router())
}
