pub mod auth;
pub mod central;
pub mod health;
pub mod hospital;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree.
///
/// Route hierarchy:
///
/// ```text
/// /register_hospital                               register (public)
/// /login_hospital                                  hospital login (public)
/// /login_central                                   operator login (public)
///
/// /upload_dataset                                  multipart upload (POST)
/// /train_model                                     train on latest dataset (POST)
/// /training_runs/{hospital_id}                     run history (GET)
/// /get_weights/{hospital_id}                       current snapshot (GET)
/// /send_weights                                    send snapshot to central (POST)
///
/// /central/hospitals                               all hospitals (GET)
/// /central/weights_received                        send receipts (GET)
/// /central/summary                                 sent / pending overview (GET)
/// /central/global_model                            latest aggregate (GET)
/// /central/aggregate                               run FedAvg (POST, operator)
/// /central/training/{hospital_id}/abort            cancel training (POST, operator)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(hospital::router())
        .nest("/central", central::router())
}
