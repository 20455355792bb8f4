//! Hospital entity model and DTOs.

use hygieia_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full hospital row from the `hospitals` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`HospitalResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Hospital {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub contact_number: String,
    pub created_at: Timestamp,
}

/// Public hospital fields shown on the central console.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HospitalResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
}

impl From<Hospital> for HospitalResponse {
    fn from(h: Hospital) -> Self {
        Self {
            id: h.id,
            name: h.name,
            email: h.email,
            created_at: h.created_at,
        }
    }
}

/// DTO for creating a new hospital. The password is already hashed.
#[derive(Debug)]
pub struct CreateHospital {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub contact_number: String,
}
