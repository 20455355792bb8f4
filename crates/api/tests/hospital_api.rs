//! HTTP-level integration tests for the hospital workflow: upload, train,
//! read and send weights.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, central_token, get, post_auth, post_json, post_multipart, register, send, train,
    upload_sample, upload_slow, wait_until_idle, wait_until_running, SAMPLE_CSV,
};
use serde_json::json;

/// Start `/train_model` for `hospital_id` on a spawned task.
fn spawn_train(
    app: &common::TestApp,
    hospital_id: i64,
) -> tokio::task::JoinHandle<axum::http::Response<axum::body::Body>> {
    tokio::spawn(post_json(
        app.app(),
        "/train_model",
        json!({ "hospital_id": hospital_id }),
    ))
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_accepts_csv() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;

    let response = upload_sample(&app, id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Dataset patients.csv uploaded successfully");
    assert_eq!(json["dataset"]["row_count"], 6);
    assert_eq!(json["dataset"]["feature_count"], 2);
}

#[tokio::test]
async fn upload_for_unknown_hospital_is_not_found() {
    let app = common::build_test_app().await;
    let response = upload_sample(&app, 42).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["detail"],
        "Hospital with id 42 not found"
    );
}

#[tokio::test]
async fn upload_rejects_unparseable_file() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;

    let response = post_multipart(
        app.app(),
        "/upload_dataset",
        Some(&id.to_string()),
        Some(("notes.csv", b"name,outcome\nalice,1\nbob,0\n")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn upload_requires_both_fields() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;

    let no_file = post_multipart(app.app(), "/upload_dataset", Some(&id.to_string()), None).await;
    assert_eq!(no_file.status(), StatusCode::BAD_REQUEST);

    let no_id = post_multipart(
        app.app(),
        "/upload_dataset",
        None,
        Some(("patients.csv", SAMPLE_CSV.as_bytes())),
    )
    .await;
    assert_eq!(no_id.status(), StatusCode::BAD_REQUEST);

    let bad_id = post_multipart(
        app.app(),
        "/upload_dataset",
        Some("seven"),
        Some(("patients.csv", SAMPLE_CSV.as_bytes())),
    )
    .await;
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

#[tokio::test]
async fn train_without_upload_is_precondition_failure() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;

    let response = train(&app, id).await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(body_json(response).await["code"], "PRECONDITION_FAILED");
    // A failed request must not leave the slot held.
    assert!(!app.state.training_locks.is_running(id));
}

#[tokio::test]
async fn train_unknown_hospital_is_not_found() {
    let app = common::build_test_app().await;
    let response = train(&app, 99).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn train_publishes_weights() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;
    upload_sample(&app, id).await;

    let response = train(&app, id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Model trained successfully");
    let accuracy = json["accuracy"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
    assert!(json["loss"].as_f64().unwrap() >= 0.0);

    let weights = body_json(get(app.app(), &format!("/get_weights/{id}")).await).await;
    let coefficients = weights["coefficients"].as_array().unwrap();
    assert_eq!(coefficients.len(), 1);
    assert_eq!(coefficients[0].as_array().unwrap().len(), 2);
    assert_eq!(weights["intercept"].as_array().unwrap().len(), 1);
    assert_eq!(weights["training_run_id"], json["training_run_id"]);
    assert_eq!(weights["classes"], json!(["0", "1"]));

    // The published weights reproduce the accuracy the trainer reported.
    let w: Vec<f64> = coefficients[0]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    let b = weights["intercept"][0].as_f64().unwrap();
    let rows: Vec<Vec<f64>> = SAMPLE_CSV
        .lines()
        .skip(1)
        .map(|line| line.split(',').map(|v| v.parse().unwrap()).collect())
        .collect();
    let correct = rows
        .iter()
        .filter(|row| {
            let z = w[0] * row[0] + w[1] * row[1] + b;
            (z > 0.0) == (row[2] == 1.0)
        })
        .count();
    assert!((correct as f64 / rows.len() as f64 - accuracy).abs() < 1e-9);

    // Training is deterministic, so a second run publishes the same weights
    // under the new run id.
    let again = body_json(train(&app, id).await).await;
    let republished = body_json(get(app.app(), &format!("/get_weights/{id}")).await).await;
    assert_eq!(republished["training_run_id"], again["training_run_id"]);
    assert_ne!(republished["training_run_id"], weights["training_run_id"]);
    assert_eq!(republished["coefficients"], weights["coefficients"]);
    assert_eq!(republished["intercept"], weights["intercept"]);
}

#[tokio::test]
async fn concurrent_training_is_rejected() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;
    upload_sample(&app, id).await;

    let in_flight = app
        .state
        .training_locks
        .try_acquire(id)
        .expect("slot should be free");

    let response = train(&app, id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_json(response)
        .await["detail"]
        .as_str()
        .unwrap()
        .contains("already in progress"));

    // Another hospital is unaffected.
    let other = register(&app, "Riverside").await;
    upload_sample(&app, other).await;
    assert_eq!(train(&app, other).await.status(), StatusCode::OK);

    drop(in_flight);
    assert_eq!(train(&app, id).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn second_request_conflicts_while_a_run_is_in_flight() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;
    upload_slow(&app, id).await;
    let token = central_token(&app).await;

    let first = spawn_train(&app, id);
    wait_until_running(&app, id).await;

    let second = train(&app, id).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(second).await["detail"],
        "Training is already in progress for this hospital"
    );

    // End the first run rather than waiting for the full fit.
    let abort = post_auth(app.app(), &format!("/central/training/{id}/abort"), &token).await;
    assert_eq!(abort.status(), StatusCode::OK);
    assert_eq!(first.await.unwrap().status(), StatusCode::CONFLICT);

    wait_until_idle(&app, id).await;
    upload_sample(&app, id).await;
    assert_eq!(train(&app, id).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn aborted_run_publishes_nothing() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;
    upload_slow(&app, id).await;
    let token = central_token(&app).await;

    let run = spawn_train(&app, id);
    wait_until_running(&app, id).await;

    let abort = post_auth(app.app(), &format!("/central/training/{id}/abort"), &token).await;
    assert_eq!(abort.status(), StatusCode::OK);
    assert_eq!(
        body_json(abort).await["message"],
        format!("Training for hospital {id} is being aborted")
    );

    let response = run.await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["detail"], "Training was aborted");
    assert_eq!(json["code"], "CONFLICT");

    assert!(!app.state.training_locks.is_running(id));
    let weights = get(app.app(), &format!("/get_weights/{id}")).await;
    assert_eq!(weights.status(), StatusCode::NOT_FOUND);
    let runs = body_json(get(app.app(), &format!("/training_runs/{id}")).await).await;
    assert_eq!(runs["runs"], json!([]));
}

#[tokio::test]
async fn run_past_its_time_limit_is_gateway_timeout() {
    let mut config = common::test_config();
    config.training_timeout_secs = 0;
    let app = common::build_test_app_with(config).await;
    let id = register(&app, "GenCity").await;
    upload_slow(&app, id).await;

    let response = train(&app, id).await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "TRAINING_TIMEOUT");
    assert_eq!(json["detail"], "Training did not finish within 0 seconds");

    // The fit was joined before responding.
    assert!(!app.state.training_locks.is_running(id));
    let weights = get(app.app(), &format!("/get_weights/{id}")).await;
    assert_eq!(weights.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dropped_request_releases_the_slot_without_publishing() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;
    upload_slow(&app, id).await;

    let run = spawn_train(&app, id);
    wait_until_running(&app, id).await;
    run.abort();
    assert!(run.await.unwrap_err().is_cancelled());

    // The slot frees once the fit has stopped, long before it would finish.
    wait_until_idle(&app, id).await;
    let weights = get(app.app(), &format!("/get_weights/{id}")).await;
    assert_eq!(weights.status(), StatusCode::NOT_FOUND);

    upload_sample(&app, id).await;
    assert_eq!(train(&app, id).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn training_history_is_newest_first() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;
    upload_sample(&app, id).await;

    let first = body_json(train(&app, id).await).await["training_run_id"].clone();
    let second = body_json(train(&app, id).await).await["training_run_id"].clone();

    let response = get(app.app(), &format!("/training_runs/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let runs = body_json(response).await["runs"].as_array().unwrap().clone();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["id"], second);
    assert_eq!(runs[1]["id"], first);
    assert_eq!(runs[0]["sample_count"], 6);

    let missing = get(app.app(), "/training_runs/999").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reupload_keeps_existing_snapshot() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;
    upload_sample(&app, id).await;
    train(&app, id).await;

    let before = body_json(get(app.app(), &format!("/get_weights/{id}")).await).await;
    upload_sample(&app, id).await;
    let after = body_json(get(app.app(), &format!("/get_weights/{id}")).await).await;
    assert_eq!(before, after);
}

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

#[tokio::test]
async fn weights_before_training_are_not_found() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;

    let response = get(app.app(), &format!("/get_weights/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn send_for_unknown_hospital_is_not_found() {
    let app = common::build_test_app().await;
    let response = post_json(app.app(), "/send_weights", json!({ "hospital_id": 5 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["detail"],
        "Hospital with id 5 not found"
    );
}

#[tokio::test]
async fn send_acknowledges() {
    let app = common::build_test_app().await;
    let id = register(&app, "GenCity").await;
    upload_sample(&app, id).await;
    train(&app, id).await;

    let response = send(&app, id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Weights sent to central successfully");
    assert!(json["sent_at"].is_string());
}
