//! Handlers for a hospital's own dataset and training lifecycle.

use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use hygieia_core::dataset::parse_dataset;
use hygieia_core::error::CoreError;
use hygieia_core::types::DbId;
use hygieia_db::models::dataset::{CreateDataset, DatasetSummary};
use hygieia_db::models::training_run::{CreateTrainingRun, TrainingRun};
use hygieia_db::models::weights::ModelWeights;
use hygieia_db::repositories::{DatasetRepo, HospitalRepo, TrainingRunRepo};
use serde::{Deserialize, Serialize};

use crate::engine::run_training;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// File name recorded when the multipart part carries none.
const DEFAULT_FILE_NAME: &str = "dataset.csv";

/// Request body carrying only a hospital id.
#[derive(Debug, Deserialize)]
pub struct HospitalIdRequest {
    pub hospital_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub dataset: DatasetSummary,
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub success: bool,
    pub message: String,
    pub accuracy: f64,
    pub loss: f64,
    pub training_run_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct TrainingRunsResponse {
    pub success: bool,
    pub runs: Vec<TrainingRun>,
}

/// Fail with 404 unless the hospital exists.
pub(crate) async fn ensure_hospital(state: &AppState, hospital_id: DbId) -> AppResult<()> {
    if HospitalRepo::exists(&state.pool, hospital_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Hospital",
            id: hospital_id,
        }))
    }
}

/// POST /upload_dataset
///
/// Multipart fields: `hospital_id` (text) and `file` (CSV). The file is
/// validated before it is stored and becomes the hospital's active dataset.
pub async fn upload_dataset(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut hospital_id: Option<DbId> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("hospital_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let id = text.trim().parse::<DbId>().map_err(|_| {
                    AppError::BadRequest(format!("hospital_id must be an integer, got '{text}'"))
                })?;
                hospital_id = Some(id);
            }
            Some("file") => {
                let name = field
                    .file_name()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or(DEFAULT_FILE_NAME)
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((name, data.to_vec()));
            }
            _ => {}
        }
    }

    let hospital_id =
        hospital_id.ok_or_else(|| AppError::BadRequest("Missing hospital_id field".into()))?;
    let (file_name, content) =
        file.ok_or_else(|| AppError::BadRequest("Missing file field".into()))?;

    ensure_hospital(&state, hospital_id).await?;

    let shape = parse_dataset(&content)?.shape();

    let dataset = DatasetRepo::create(
        &state.pool,
        &CreateDataset {
            hospital_id,
            file_name,
            content,
            row_count: shape.row_count as i64,
            feature_count: shape.feature_count as i64,
        },
    )
    .await?;

    tracing::info!(
        hospital_id,
        dataset_id = dataset.id,
        rows = shape.row_count,
        features = shape.feature_count,
        classes = shape.class_count,
        "Dataset uploaded",
    );

    Ok(Json(UploadResponse {
        success: true,
        message: format!("Dataset {} uploaded successfully", dataset.file_name),
        dataset,
    }))
}

/// POST /train_model
///
/// Train on the hospital's latest dataset and publish the resulting weights
/// as its snapshot. Only one run per hospital may be in flight.
pub async fn train_model(
    State(state): State<AppState>,
    Json(input): Json<HospitalIdRequest>,
) -> AppResult<Json<TrainResponse>> {
    let hospital_id = input.hospital_id;
    ensure_hospital(&state, hospital_id).await?;

    let guard = state.training_locks.try_acquire(hospital_id).ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Training is already in progress for this hospital".into(),
        ))
    })?;

    let stored = DatasetRepo::find_latest(&state.pool, hospital_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Precondition(
                "No dataset uploaded for this hospital".into(),
            ))
        })?;

    let dataset = parse_dataset(&stored.content)?;
    tracing::info!(
        hospital_id,
        dataset_id = stored.id,
        rows = dataset.len(),
        "Training started"
    );

    let limit = Duration::from_secs(state.config.training_timeout_secs);
    let (model, guard) = run_training(dataset, guard, limit).await?;

    if !guard.begin_publish() {
        return Err(AppError::Core(CoreError::Conflict(
            "Training was aborted".into(),
        )));
    }

    let (run, _snapshot) = TrainingRunRepo::record_with_snapshot(
        &state.pool,
        &CreateTrainingRun {
            hospital_id,
            dataset_id: stored.id,
            accuracy: model.accuracy,
            loss: model.loss,
            sample_count: model.sample_count as i64,
            iterations: model.iterations as i64,
        },
        &ModelWeights {
            classes: model.classes,
            feature_names: model.feature_names,
            coefficients: model.coefficients,
            intercept: model.intercept,
        },
    )
    .await?;
    drop(guard);

    tracing::info!(
        hospital_id,
        training_run_id = run.id,
        accuracy = run.accuracy,
        loss = run.loss,
        iterations = run.iterations,
        "Training finished"
    );

    Ok(Json(TrainResponse {
        success: true,
        message: "Model trained successfully".into(),
        accuracy: run.accuracy,
        loss: run.loss,
        training_run_id: run.id,
    }))
}

/// GET /training_runs/{hospital_id}
pub async fn list_training_runs(
    State(state): State<AppState>,
    Path(hospital_id): Path<DbId>,
) -> AppResult<Json<TrainingRunsResponse>> {
    ensure_hospital(&state, hospital_id).await?;
    let runs = TrainingRunRepo::list_by_hospital(&state.pool, hospital_id).await?;
    Ok(Json(TrainingRunsResponse {
        success: true,
        runs,
    }))
}
