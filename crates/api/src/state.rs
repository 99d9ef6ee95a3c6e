use std::sync::Arc;

use datarules_pipeline::{PgRecordStore, RuleRunner};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference counted and the config is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: datarules_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Rule runner over the Postgres store.
    pub fn runner(&self) -> RuleRunner<PgRecordStore> {
        RuleRunner::new(PgRecordStore::new(self.pool.clone()))
    }
}
