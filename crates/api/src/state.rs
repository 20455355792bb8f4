use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::TrainingLocks;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hygieia_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Training runs currently in flight, one per hospital.
    pub training_locks: TrainingLocks,
}
