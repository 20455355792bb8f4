//! Repository for the `hospital_datasets` table.

use chrono::Utc;
use hygieia_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::dataset::{CreateDataset, DatasetSummary, HospitalDataset};

const SUMMARY_COLUMNS: &str = "id, hospital_id, file_name, row_count, feature_count, uploaded_at";

pub struct DatasetRepo;

impl DatasetRepo {
    /// Store a new upload. It becomes the hospital's active dataset.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateDataset,
    ) -> Result<DatasetSummary, sqlx::Error> {
        let query = format!(
            "INSERT INTO hospital_datasets
                (hospital_id, file_name, content, row_count, feature_count, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {SUMMARY_COLUMNS}"
        );
        sqlx::query_as::<_, DatasetSummary>(&query)
            .bind(input.hospital_id)
            .bind(&input.file_name)
            .bind(&input.content)
            .bind(input.row_count)
            .bind(input.feature_count)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// The most recent upload for a hospital, including file contents.
    pub async fn find_latest(
        pool: &SqlitePool,
        hospital_id: DbId,
    ) -> Result<Option<HospitalDataset>, sqlx::Error> {
        sqlx::query_as::<_, HospitalDataset>(
            "SELECT id, hospital_id, file_name, content, row_count, feature_count, uploaded_at
             FROM hospital_datasets
             WHERE hospital_id = ?1
             ORDER BY id DESC
             LIMIT 1",
        )
        .bind(hospital_id)
        .fetch_optional(pool)
        .await
    }
}
