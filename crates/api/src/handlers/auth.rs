//! Handlers for registration and login.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use hygieia_core::error::CoreError;
use hygieia_core::registration::{validate_registration, RegistrationFields};
use hygieia_core::types::DbId;
use hygieia_db::models::hospital::CreateHospital;
use hygieia_db::repositories::{CentralAdminRepo, HospitalRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, CENTRAL_ROLE};
use crate::auth::password::{hash_password, verify_dummy, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /register_hospital`.
#[derive(Debug, Deserialize)]
pub struct RegisterHospitalRequest {
    /// Hospital name, also used as the login username.
    pub username: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub contact_number: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterHospitalResponse {
    pub success: bool,
    pub message: String,
    pub hospital_id: DbId,
}

/// Request body for both login endpoints.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct HospitalLoginResponse {
    pub success: bool,
    pub message: String,
    pub id: DbId,
    pub hospital_id: DbId,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CentralLoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /register_hospital
///
/// Create a hospital account. Email and name must both be unused.
pub async fn register_hospital(
    State(state): State<AppState>,
    Json(input): Json<RegisterHospitalRequest>,
) -> AppResult<(StatusCode, Json<RegisterHospitalResponse>)> {
    validate_registration(&RegistrationFields {
        name: &input.username,
        email: &input.email,
        password: &input.password,
        address: &input.address,
        contact_number: &input.contact_number,
    })?;

    let name = input.username.trim();
    let email = input.email.trim().to_lowercase();

    if HospitalRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "A hospital with this email already exists".into(),
        )));
    }
    if HospitalRepo::find_by_name(&state.pool, name).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "A hospital with this name already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let hospital = HospitalRepo::create(
        &state.pool,
        &CreateHospital {
            name: name.to_string(),
            email,
            password_hash,
            address: input.address.trim().to_string(),
            contact_number: input.contact_number.trim().to_string(),
        },
    )
    .await?;

    tracing::info!(hospital_id = hospital.id, name = %hospital.name, "Hospital registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterHospitalResponse {
            success: true,
            message: "Hospital registered successfully".into(),
            hospital_id: hospital.id,
        }),
    ))
}

/// POST /login_hospital
///
/// Authenticate a hospital by name + password.
pub async fn login_hospital(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<HospitalLoginResponse>> {
    let Some(hospital) = HospitalRepo::find_by_name(&state.pool, input.username.trim()).await?
    else {
        verify_dummy(&input.password);
        return Err(invalid_credentials("Invalid hospital credentials"));
    };

    let password_valid = verify_password(&input.password, &hospital.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid_credentials("Invalid hospital credentials"));
    }

    tracing::info!(hospital_id = hospital.id, "Hospital logged in");

    Ok(Json(HospitalLoginResponse {
        success: true,
        message: "Hospital login successful".into(),
        id: hospital.id,
        hospital_id: hospital.id,
        name: hospital.name,
    }))
}

/// POST /login_central
///
/// Authenticate a central operator. Returns a bearer token for the
/// operator-only endpoints.
pub async fn login_central(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<CentralLoginResponse>> {
    let Some(admin) = CentralAdminRepo::find_by_username(&state.pool, input.username.trim()).await?
    else {
        verify_dummy(&input.password);
        return Err(invalid_credentials("Invalid central credentials"));
    };

    let password_valid = verify_password(&input.password, &admin.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid_credentials("Invalid central credentials"));
    }

    let jwt = &state.config.jwt;
    let token = generate_access_token(admin.id, CENTRAL_ROLE, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(admin_id = admin.id, "Central operator logged in");

    Ok(Json(CentralLoginResponse {
        success: true,
        message: "Central login successful".into(),
        token,
        expires_in: jwt.access_token_expiry_mins * 60,
    }))
}

fn invalid_credentials(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}
