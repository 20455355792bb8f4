//! Repository for the `weight_transfers` table.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::weights::{WeightReceipt, WeightSnapshot, WeightTransfer};

const COLUMNS: &str = "hospital_id, training_run_id, classes, feature_names, coefficients, \
                       intercept, sample_count, sent_at";

pub struct WeightTransferRepo;

impl WeightTransferRepo {
    /// Record that `snapshot` was sent to the central service now.
    ///
    /// Keyed by hospital: a repeated send replaces the earlier row and
    /// moves `sent_at` forward.
    pub async fn upsert_from_snapshot(
        pool: &SqlitePool,
        snapshot: &WeightSnapshot,
    ) -> Result<WeightTransfer, sqlx::Error> {
        let query = format!(
            "INSERT INTO weight_transfers
                (hospital_id, training_run_id, classes, feature_names, coefficients,
                 intercept, sample_count, sent_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (hospital_id) DO UPDATE SET
                training_run_id = excluded.training_run_id,
                classes = excluded.classes,
                feature_names = excluded.feature_names,
                coefficients = excluded.coefficients,
                intercept = excluded.intercept,
                sample_count = excluded.sample_count,
                sent_at = excluded.sent_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WeightTransfer>(&query)
            .bind(snapshot.hospital_id)
            .bind(snapshot.training_run_id)
            .bind(Json(&snapshot.classes.0))
            .bind(Json(&snapshot.feature_names.0))
            .bind(Json(&snapshot.coefficients.0))
            .bind(Json(&snapshot.intercept.0))
            .bind(snapshot.sample_count)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// One receipt per hospital, most recently sent first.
    pub async fn list_receipts(pool: &SqlitePool) -> Result<Vec<WeightReceipt>, sqlx::Error> {
        let mut receipts =
            sqlx::query_as::<_, WeightReceipt>("SELECT hospital_id, sent_at FROM weight_transfers")
                .fetch_all(pool)
                .await?;
        // Sorted after decoding: the stored RFC 3339 text does not order
        // lexically when fractional-second widths differ.
        receipts.sort_by(|a, b| {
            b.sent_at
                .cmp(&a.sent_at)
                .then_with(|| b.hospital_id.cmp(&a.hospital_id))
        });
        Ok(receipts)
    }

    /// Every stored transfer, oldest send first.
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<WeightTransfer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM weight_transfers");
        let mut transfers = sqlx::query_as::<_, WeightTransfer>(&query)
            .fetch_all(pool)
            .await?;
        transfers.sort_by(|a, b| {
            a.sent_at
                .cmp(&b.sent_at)
                .then_with(|| a.hospital_id.cmp(&b.hospital_id))
        });
        Ok(transfers)
    }
}
