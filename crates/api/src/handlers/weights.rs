//! Handlers for reading a hospital's weights and sending them to the
//! central service.

use axum::extract::{Path, State};
use axum::Json;
use hygieia_core::error::CoreError;
use hygieia_core::types::{DbId, Timestamp};
use hygieia_db::models::weights::WeightSnapshot;
use hygieia_db::repositories::{WeightSnapshotRepo, WeightTransferRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::hospital::{ensure_hospital, HospitalIdRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WeightsResponse {
    pub coefficients: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    pub classes: Vec<String>,
    pub feature_names: Vec<String>,
    pub training_run_id: DbId,
    pub updated_at: Timestamp,
}

impl From<WeightSnapshot> for WeightsResponse {
    fn from(s: WeightSnapshot) -> Self {
        Self {
            coefficients: s.coefficients.0,
            intercept: s.intercept.0,
            classes: s.classes.0,
            feature_names: s.feature_names.0,
            training_run_id: s.training_run_id,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendWeightsResponse {
    pub success: bool,
    pub message: String,
    pub sent_at: Timestamp,
}

async fn load_snapshot(state: &AppState, hospital_id: DbId) -> AppResult<WeightSnapshot> {
    WeightSnapshotRepo::find_by_hospital(&state.pool, hospital_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WeightSnapshot",
            id: hospital_id,
        }))
}

/// GET /get_weights/{hospital_id}
pub async fn get_weights(
    State(state): State<AppState>,
    Path(hospital_id): Path<DbId>,
) -> AppResult<Json<WeightsResponse>> {
    let snapshot = load_snapshot(&state, hospital_id).await?;
    Ok(Json(snapshot.into()))
}

/// POST /send_weights
///
/// Copy the current snapshot to the central ledger. Sending again replaces
/// the earlier copy.
pub async fn send_weights(
    State(state): State<AppState>,
    Json(input): Json<HospitalIdRequest>,
) -> AppResult<Json<SendWeightsResponse>> {
    let hospital_id = input.hospital_id;
    ensure_hospital(&state, hospital_id).await?;
    let snapshot = load_snapshot(&state, hospital_id).await?;

    let transfer = WeightTransferRepo::upsert_from_snapshot(&state.pool, &snapshot).await?;

    tracing::info!(
        hospital_id,
        training_run_id = transfer.training_run_id,
        "Weights sent to central"
    );

    Ok(Json(SendWeightsResponse {
        success: true,
        message: "Weights sent to central successfully".into(),
        sent_at: transfer.sent_at,
    }))
}
