//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hygieia_core::error::CoreError;
use hygieia_core::types::DbId;

use crate::auth::jwt::{validate_token, CENTRAL_ROLE};
use crate::error::AppError;
use crate::state::AppState;

/// Central operator extracted from a JWT Bearer token in the `Authorization` header.
///
/// Use this as an extractor parameter in any handler that only operators may call:
///
/// ```ignore
/// async fn my_handler(operator: CentralOperator) -> AppResult<Json<()>> {
///     tracing::info!(admin_id = operator.admin_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CentralOperator {
    /// The operator's internal database id (from `claims.sub`).
    pub admin_id: DbId,
}

impl FromRequestParts<AppState> for CentralOperator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        if claims.role != CENTRAL_ROLE {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Central operator token required".into(),
            )));
        }

        Ok(CentralOperator {
            admin_id: claims.sub,
        })
    }
}
