//! Repository for the `global_models` table.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::global_model::{CreateGlobalModel, GlobalModel};

const COLUMNS: &str = "id, classes, feature_names, coefficients, intercept, contributor_ids, \
                       total_samples, created_at";

pub struct GlobalModelRepo;

impl GlobalModelRepo {
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateGlobalModel,
    ) -> Result<GlobalModel, sqlx::Error> {
        let query = format!(
            "INSERT INTO global_models
                (classes, feature_names, coefficients, intercept, contributor_ids,
                 total_samples, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GlobalModel>(&query)
            .bind(Json(&input.weights.classes))
            .bind(Json(&input.weights.feature_names))
            .bind(Json(&input.weights.coefficients))
            .bind(Json(&input.weights.intercept))
            .bind(Json(&input.contributor_ids))
            .bind(input.total_samples)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// The most recently aggregated model.
    pub async fn find_latest(pool: &SqlitePool) -> Result<Option<GlobalModel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM global_models ORDER BY id DESC LIMIT 1");
        sqlx::query_as::<_, GlobalModel>(&query)
            .fetch_optional(pool)
            .await
    }
}
