//! Repository for the `hospitals` table.

use chrono::Utc;
use hygieia_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::hospital::{CreateHospital, Hospital, HospitalResponse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, address, contact_number, created_at";

/// Provides create and lookup operations for hospitals.
pub struct HospitalRepo;

impl HospitalRepo {
    /// Insert a new hospital, returning the created row.
    ///
    /// A duplicate name or email surfaces as a unique-violation
    /// `sqlx::Error::Database`.
    pub async fn create(pool: &SqlitePool, input: &CreateHospital) -> Result<Hospital, sqlx::Error> {
        let query = format!(
            "INSERT INTO hospitals (name, email, password_hash, address, contact_number, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hospital>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.address)
            .bind(&input.contact_number)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Hospital>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hospitals WHERE id = ?1");
        sqlx::query_as::<_, Hospital>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a hospital by its name, which is also its login username.
    pub async fn find_by_name(
        pool: &SqlitePool,
        name: &str,
    ) -> Result<Option<Hospital>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hospitals WHERE name = ?1");
        sqlx::query_as::<_, Hospital>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<Hospital>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hospitals WHERE email = ?1");
        sqlx::query_as::<_, Hospital>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM hospitals WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    /// List public hospital fields, most recently registered first.
    ///
    /// Ids are assigned in registration order, so ordering by id matches
    /// ordering by `created_at`.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<HospitalResponse>, sqlx::Error> {
        sqlx::query_as::<_, HospitalResponse>(
            "SELECT id, name, email, created_at FROM hospitals ORDER BY id DESC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM hospitals")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
