//! Repository for the `central_admins` table.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::central_admin::CentralAdmin;

const COLUMNS: &str = "id, username, password_hash, created_at, updated_at";

pub struct CentralAdminRepo;

impl CentralAdminRepo {
    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<CentralAdmin>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM central_admins WHERE username = ?1");
        sqlx::query_as::<_, CentralAdmin>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Create the account, or replace its password hash if it already exists.
    ///
    /// Used to provision operators from configuration at startup.
    pub async fn upsert(
        pool: &SqlitePool,
        username: &str,
        password_hash: &str,
    ) -> Result<CentralAdmin, sqlx::Error> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO central_admins (username, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT (username) DO UPDATE SET
                password_hash = excluded.password_hash,
                updated_at = excluded.updated_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CentralAdmin>(&query)
            .bind(username)
            .bind(password_hash)
            .bind(now)
            .fetch_one(pool)
            .await
    }
}
