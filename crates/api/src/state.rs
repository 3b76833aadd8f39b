use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::AchievementEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and everything else is
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: engagement_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Unlock orchestration (stats fetch, evaluation, ledger writes, notifications).
    pub engine: Arc<AchievementEngine>,
}
