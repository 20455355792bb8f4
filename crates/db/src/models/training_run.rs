//! Completed training runs.

use hygieia_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TrainingRun {
    pub id: DbId,
    pub hospital_id: DbId,
    pub dataset_id: DbId,
    pub accuracy: f64,
    pub loss: f64,
    pub sample_count: i64,
    pub iterations: i64,
    pub completed_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateTrainingRun {
    pub hospital_id: DbId,
    pub dataset_id: DbId,
    pub accuracy: f64,
    pub loss: f64,
    pub sample_count: i64,
    pub iterations: i64,
}
