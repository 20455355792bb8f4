use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Training runs currently in flight.
    pub training_in_progress: usize,
}

/// Liveness probe kept for clients that poll `/ping`.
#[derive(Serialize)]
pub struct PingResponse {
    pub msg: &'static str,
    pub status: &'static str,
}

/// GET /health -- returns service and database health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = hygieia_db::health_check(&state.pool).await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        training_in_progress: state.training_locks.running_count(),
    })
}

/// GET /ping
async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        msg: "pong",
        status: "healthy",
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ping", get(ping))
}
