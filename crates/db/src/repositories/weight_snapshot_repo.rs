//! Repository for the `weight_snapshots` table.
//!
//! Snapshots are written only by
//! [`TrainingRunRepo::record_with_snapshot`](super::TrainingRunRepo::record_with_snapshot).

use hygieia_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::weights::WeightSnapshot;

pub(crate) const COLUMNS: &str = "hospital_id, training_run_id, classes, feature_names, \
                                  coefficients, intercept, sample_count, updated_at";

pub struct WeightSnapshotRepo;

impl WeightSnapshotRepo {
    pub async fn find_by_hospital(
        pool: &SqlitePool,
        hospital_id: DbId,
    ) -> Result<Option<WeightSnapshot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM weight_snapshots WHERE hospital_id = ?1");
        sqlx::query_as::<_, WeightSnapshot>(&query)
            .bind(hospital_id)
            .fetch_optional(pool)
            .await
    }
}
