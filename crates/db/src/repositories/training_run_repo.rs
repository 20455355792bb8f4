//! Repository for the `training_runs` table.
//!
//! A completed run and the hospital's new weight snapshot are written
//! together in [`TrainingRunRepo::record_with_snapshot`], so readers of
//! `weight_snapshots` never observe a snapshot without its run.

use chrono::Utc;
use hygieia_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::training_run::{CreateTrainingRun, TrainingRun};
use crate::models::weights::{ModelWeights, WeightSnapshot};
use crate::repositories::weight_snapshot_repo::COLUMNS as SNAPSHOT_COLUMNS;

const COLUMNS: &str =
    "id, hospital_id, dataset_id, accuracy, loss, sample_count, iterations, completed_at";

pub struct TrainingRunRepo;

impl TrainingRunRepo {
    /// Insert a run and upsert the hospital's snapshot in one transaction.
    pub async fn record_with_snapshot(
        pool: &SqlitePool,
        run: &CreateTrainingRun,
        weights: &ModelWeights,
    ) -> Result<(TrainingRun, WeightSnapshot), sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO training_runs
                (hospital_id, dataset_id, accuracy, loss, sample_count, iterations, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {COLUMNS}"
        );
        let training_run = sqlx::query_as::<_, TrainingRun>(&query)
            .bind(run.hospital_id)
            .bind(run.dataset_id)
            .bind(run.accuracy)
            .bind(run.loss)
            .bind(run.sample_count)
            .bind(run.iterations)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO weight_snapshots
                (hospital_id, training_run_id, classes, feature_names, coefficients,
                 intercept, sample_count, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (hospital_id) DO UPDATE SET
                training_run_id = excluded.training_run_id,
                classes = excluded.classes,
                feature_names = excluded.feature_names,
                coefficients = excluded.coefficients,
                intercept = excluded.intercept,
                sample_count = excluded.sample_count,
                updated_at = excluded.updated_at
             RETURNING {SNAPSHOT_COLUMNS}"
        );
        let snapshot = sqlx::query_as::<_, WeightSnapshot>(&query)
            .bind(run.hospital_id)
            .bind(training_run.id)
            .bind(Json(&weights.classes))
            .bind(Json(&weights.feature_names))
            .bind(Json(&weights.coefficients))
            .bind(Json(&weights.intercept))
            .bind(run.sample_count)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((training_run, snapshot))
    }

    /// Run history for a hospital, newest first.
    pub async fn list_by_hospital(
        pool: &SqlitePool,
        hospital_id: DbId,
    ) -> Result<Vec<TrainingRun>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM training_runs WHERE hospital_id = ?1 ORDER BY id DESC"
        );
        sqlx::query_as::<_, TrainingRun>(&query)
            .bind(hospital_id)
            .fetch_all(pool)
            .await
    }
}
