//! Route definitions for registration and login.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// ```text
/// POST /register_hospital  -> register_hospital
/// POST /login_hospital     -> login_hospital
/// POST /login_central      -> login_central
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register_hospital", post(auth::register_hospital))
        .route("/login_hospital", post(auth::login_hospital))
        .route("/login_central", post(auth::login_central))
}
