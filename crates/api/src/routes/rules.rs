//! Route definitions for the `/rules` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rules;
use crate::state::AppState;

/// Routes mounted at `/rules`.
///
/// ```text
/// GET    /          -> list_rules        (?entity_type)
/// POST   /          -> create_rule
/// GET    /export    -> export
/// POST   /import    -> import            (?replace)
/// POST   /apply     -> apply
/// GET    /{id}      -> get_rule
/// PUT    /{id}      -> replace_rule
/// PATCH  /{id}      -> update_rule_state
/// DELETE /{id}      -> delete_rule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rules::list_rules).post(rules::create_rule))
        .route("/export", get(rules::export))
        .route("/import", post(rules::import))
        .route("/apply", post(rules::apply))
        .route(
            "/{id}",
            get(rules::get_rule)
                .put(rules::replace_rule)
                .patch(rules::update_rule_state)
                .delete(rules::delete_rule),
        )
}
