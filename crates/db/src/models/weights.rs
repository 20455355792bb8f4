//! Per-hospital weight snapshots and the copies sent to the central service.

use hygieia_core::aggregation::Contribution;
use hygieia_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// Model parameters shared by snapshots, transfers and global models.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelWeights {
    pub classes: Vec<String>,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

/// Current weights of one hospital (`weight_snapshots`).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WeightSnapshot {
    pub hospital_id: DbId,
    pub training_run_id: DbId,
    pub classes: Json<Vec<String>>,
    pub feature_names: Json<Vec<String>>,
    pub coefficients: Json<Vec<Vec<f64>>>,
    pub intercept: Json<Vec<f64>>,
    pub sample_count: i64,
    pub updated_at: Timestamp,
}

impl WeightSnapshot {
    pub fn weights(&self) -> ModelWeights {
        ModelWeights {
            classes: self.classes.0.clone(),
            feature_names: self.feature_names.0.clone(),
            coefficients: self.coefficients.0.clone(),
            intercept: self.intercept.0.clone(),
        }
    }
}

/// Weights a hospital sent to the central service (`weight_transfers`).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WeightTransfer {
    pub hospital_id: DbId,
    pub training_run_id: DbId,
    pub classes: Json<Vec<String>>,
    pub feature_names: Json<Vec<String>>,
    pub coefficients: Json<Vec<Vec<f64>>>,
    pub intercept: Json<Vec<f64>>,
    pub sample_count: i64,
    pub sent_at: Timestamp,
}

impl From<WeightTransfer> for Contribution {
    fn from(t: WeightTransfer) -> Self {
        Contribution {
            hospital_id: t.hospital_id,
            classes: t.classes.0,
            feature_names: t.feature_names.0,
            coefficients: t.coefficients.0,
            intercept: t.intercept.0,
            sample_count: t.sample_count,
        }
    }
}

/// Row shape of the central "weights received" listing.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WeightReceipt {
    pub hospital_id: DbId,
    pub sent_at: Timestamp,
}
