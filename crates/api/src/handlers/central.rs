//! Handlers for the `/central` console: cross-hospital views, aggregation
//! and operator controls.

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::Json;
use hygieia_core::aggregation::{federated_average, Contribution};
use hygieia_core::error::CoreError;
use hygieia_core::types::{DbId, Timestamp};
use hygieia_db::models::global_model::{CreateGlobalModel, GlobalModel};
use hygieia_db::models::hospital::HospitalResponse;
use hygieia_db::models::weights::{ModelWeights, WeightReceipt};
use hygieia_db::repositories::{GlobalModelRepo, HospitalRepo, WeightTransferRepo};
use serde::Serialize;

use crate::engine::AbortOutcome;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CentralOperator;
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HospitalsResponse {
    pub success: bool,
    pub hospitals: Vec<HospitalResponse>,
}

#[derive(Debug, Serialize)]
pub struct WeightsReceivedResponse {
    pub success: bool,
    pub weights_received: Vec<WeightReceipt>,
}

/// One row of the central summary table.
#[derive(Debug, Serialize)]
pub struct HospitalStatus {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
    pub weights_sent: bool,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub total: usize,
    pub sent: usize,
    pub pending: usize,
    pub hospitals: Vec<HospitalStatus>,
}

#[derive(Debug, Serialize)]
pub struct AggregateResponse {
    pub success: bool,
    pub message: String,
    pub model: GlobalModel,
    pub skipped_hospitals: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Read-only views
// ---------------------------------------------------------------------------

/// GET /central/hospitals
pub async fn list_hospitals(State(state): State<AppState>) -> AppResult<Json<HospitalsResponse>> {
    let hospitals = HospitalRepo::list(&state.pool).await?;
    Ok(Json(HospitalsResponse {
        success: true,
        hospitals,
    }))
}

/// GET /central/weights_received
pub async fn list_weights_received(
    State(state): State<AppState>,
) -> AppResult<Json<WeightsReceivedResponse>> {
    let weights_received = WeightTransferRepo::list_receipts(&state.pool).await?;
    Ok(Json(WeightsReceivedResponse {
        success: true,
        weights_received,
    }))
}

/// GET /central/summary
///
/// Every hospital with a flag telling whether it has sent weights.
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<SummaryResponse>> {
    let hospitals = HospitalRepo::list(&state.pool).await?;
    let sent_ids: HashSet<DbId> = WeightTransferRepo::list_receipts(&state.pool)
        .await?
        .into_iter()
        .map(|r| r.hospital_id)
        .collect();

    let hospitals: Vec<HospitalStatus> = hospitals
        .into_iter()
        .map(|h| HospitalStatus {
            weights_sent: sent_ids.contains(&h.id),
            id: h.id,
            name: h.name,
            email: h.email,
            created_at: h.created_at,
        })
        .collect();

    let total = hospitals.len();
    let sent = hospitals.iter().filter(|h| h.weights_sent).count();

    Ok(Json(SummaryResponse {
        success: true,
        total,
        sent,
        pending: total - sent,
        hospitals,
    }))
}

/// GET /central/global_model
pub async fn get_global_model(State(state): State<AppState>) -> AppResult<Json<GlobalModel>> {
    let model = GlobalModelRepo::find_latest(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("No global model has been aggregated yet".into()))?;
    Ok(Json(model))
}

// ---------------------------------------------------------------------------
// Operator actions
// ---------------------------------------------------------------------------

/// POST /central/aggregate
///
/// Average all received weights into a new global model.
pub async fn aggregate(
    operator: CentralOperator,
    State(state): State<AppState>,
) -> AppResult<Json<AggregateResponse>> {
    let contributions: Vec<Contribution> = WeightTransferRepo::list_all(&state.pool)
        .await?
        .into_iter()
        .map(Contribution::from)
        .collect();

    let aggregated = federated_average(&contributions)?;

    let model = GlobalModelRepo::create(
        &state.pool,
        &CreateGlobalModel {
            weights: ModelWeights {
                classes: aggregated.classes,
                feature_names: aggregated.feature_names,
                coefficients: aggregated.coefficients,
                intercept: aggregated.intercept,
            },
            contributor_ids: aggregated.contributors,
            total_samples: aggregated.total_samples,
        },
    )
    .await?;

    if !aggregated.skipped.is_empty() {
        tracing::warn!(
            skipped = ?aggregated.skipped,
            "Skipped contributions with a different model layout"
        );
    }
    tracing::info!(
        admin_id = operator.admin_id,
        global_model_id = model.id,
        contributors = model.contributor_ids.0.len(),
        total_samples = model.total_samples,
        "Global model aggregated"
    );

    Ok(Json(AggregateResponse {
        success: true,
        message: format!(
            "Aggregated weights from {} hospital(s)",
            model.contributor_ids.0.len()
        ),
        model,
        skipped_hospitals: aggregated.skipped,
    }))
}

/// POST /central/training/{hospital_id}/abort
///
/// Cancel the hospital's in-flight training run.
pub async fn abort_training(
    operator: CentralOperator,
    State(state): State<AppState>,
    Path(hospital_id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    match state.training_locks.abort(hospital_id) {
        AbortOutcome::Requested => {}
        AbortOutcome::Publishing => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Training for hospital {hospital_id} already finished and is publishing its weights"
            ))));
        }
        AbortOutcome::Idle => {
            return Err(AppError::NotFound(format!(
                "No training run in progress for hospital {hospital_id}"
            )));
        }
    }

    tracing::info!(admin_id = operator.admin_id, hospital_id, "Training abort requested");

    Ok(Json(MessageResponse::ok(format!(
        "Training for hospital {hospital_id} is being aborted"
    ))))
}
