//! Startup provisioning.

use hygieia_db::repositories::CentralAdminRepo;
use hygieia_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::CentralAdminConfig;
use crate::error::{AppError, AppResult};

/// Create or refresh the configured central operator account.
///
/// Returns `false` without touching the database when no password is
/// configured.
pub async fn provision_central_admin(pool: &DbPool, config: &CentralAdminConfig) -> AppResult<bool> {
    let Some(password) = config.password.as_deref() else {
        tracing::warn!("CENTRAL_ADMIN_PASSWORD not set; central login is disabled");
        return Ok(false);
    };

    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let admin = CentralAdminRepo::upsert(pool, &config.username, &password_hash).await?;

    tracing::info!(admin_id = admin.id, username = %admin.username, "Central operator provisioned");
    Ok(true)
}
