//! Route definitions for the `/central` console.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::central;
use crate::state::AppState;

/// Routes mounted at `/central`.
///
/// ```text
/// GET  /hospitals                          -> list_hospitals
/// GET  /weights_received                   -> list_weights_received
/// GET  /summary                            -> summary
/// GET  /global_model                       -> get_global_model
/// POST /aggregate                          -> aggregate (operator)
/// POST /training/{hospital_id}/abort       -> abort_training (operator)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hospitals", get(central::list_hospitals))
        .route("/weights_received", get(central::list_weights_received))
        .route("/summary", get(central::summary))
        .route("/global_model", get(central::get_global_model))
        .route("/aggregate", post(central::aggregate))
        .route(
            "/training/{hospital_id}/abort",
            post(central::abort_training),
        )
}
