//! Route definitions for the hospital-side workflow.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{hospital, weights};
use crate::state::AppState;

/// ```text
/// POST /upload_dataset                -> upload_dataset
/// POST /train_model                   -> train_model
/// GET  /training_runs/{hospital_id}   -> list_training_runs
/// GET  /get_weights/{hospital_id}     -> get_weights
/// POST /send_weights                  -> send_weights
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload_dataset", post(hospital::upload_dataset))
        .route("/train_model", post(hospital::train_model))
        .route(
            "/training_runs/{hospital_id}",
            get(hospital::list_training_runs),
        )
        .route("/get_weights/{hospital_id}", get(weights::get_weights))
        .route("/send_weights", post(weights::send_weights))
}
