//! Uploaded hospital datasets.

use hygieia_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full dataset row including the raw file bytes.
#[derive(Debug, Clone, FromRow)]
pub struct HospitalDataset {
    pub id: DbId,
    pub hospital_id: DbId,
    pub file_name: String,
    pub content: Vec<u8>,
    pub row_count: i64,
    pub feature_count: i64,
    pub uploaded_at: Timestamp,
}

/// Dataset metadata without the file contents.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DatasetSummary {
    pub id: DbId,
    pub hospital_id: DbId,
    pub file_name: String,
    pub row_count: i64,
    pub feature_count: i64,
    pub uploaded_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateDataset {
    pub hospital_id: DbId,
    pub file_name: String,
    pub content: Vec<u8>,
    pub row_count: i64,
    pub feature_count: i64,
}
