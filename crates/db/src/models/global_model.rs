//! Aggregated global models produced by the central service.

use hygieia_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use crate::models::weights::ModelWeights;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GlobalModel {
    pub id: DbId,
    pub classes: Json<Vec<String>>,
    pub feature_names: Json<Vec<String>>,
    pub coefficients: Json<Vec<Vec<f64>>>,
    pub intercept: Json<Vec<f64>>,
    pub contributor_ids: Json<Vec<DbId>>,
    pub total_samples: i64,
    pub created_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateGlobalModel {
    pub weights: ModelWeights,
    pub contributor_ids: Vec<DbId>,
    pub total_samples: i64,
}
