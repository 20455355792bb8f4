#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use hygieia_api::auth::jwt::JwtConfig;
use hygieia_api::bootstrap::provision_central_admin;
use hygieia_api::config::{CentralAdminConfig, ServerConfig};
use hygieia_api::engine::TrainingLocks;
use hygieia_api::router::build_app_router;
use hygieia_api::state::AppState;
use hygieia_db::{create_pool, run_migrations, DbPool, IN_MEMORY_URL};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "central-test-password";

/// Small two-feature, two-class dataset that trains in milliseconds.
pub const SAMPLE_CSV: &str = "age,bp,outcome\n\
                              30,110,0\n\
                              35,115,0\n\
                              40,118,0\n\
                              55,140,1\n\
                              60,150,1\n\
                              65,155,1\n";

/// Noisy four-class dataset with two nearly collinear features. The fit runs
/// its full iteration budget, so a run is reliably still in flight while a
/// test acts on it.
pub fn slow_csv() -> String {
    let mut csv = String::from("a,b,c,y\n");
    for i in 0..30_000u64 {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            i % 97,
            (i % 97) * 100 + (i * 7) % 13,
            (i * 31) % 101,
            ((i * 7) % 13 + i % 3) % 4
        ));
    }
    csv
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        training_timeout_secs: 20,
        max_upload_bytes: 1024 * 1024,
        central_admin: CentralAdminConfig {
            username: ADMIN_USERNAME.to_string(),
            password: Some(ADMIN_PASSWORD.to_string()),
        },
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Fresh in-memory database with migrations applied.
pub async fn test_pool() -> DbPool {
    let pool = create_pool(IN_MEMORY_URL)
        .await
        .expect("in-memory pool should open");
    run_migrations(&pool)
        .await
        .expect("migrations should apply");
    pool
}

/// Test harness: the shared state plus the router built over it.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    /// A clone of the router, ready for one `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router over a fresh in-memory database, with
/// the central operator already provisioned.
pub async fn build_test_app() -> TestApp {
    build_test_app_with(test_config()).await
}

/// Like [`build_test_app`] but over a caller-supplied configuration.
pub async fn build_test_app_with(config: ServerConfig) -> TestApp {
    let pool = test_pool().await;
    provision_central_admin(&pool, &config.central_admin)
        .await
        .expect("operator provisioning should succeed");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        training_locks: TrainingLocks::new(),
    };
    let router = build_app_router(state.clone(), &config);
    TestApp { state, router }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a `multipart/form-data` body with an optional `hospital_id` text
/// part and an optional `file` part.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    hospital_id: Option<&str>,
    file: Option<(&str, &[u8])>,
) -> Response<Body> {
    const BOUNDARY: &str = "hygieia-test-boundary";
    let mut body: Vec<u8> = Vec::new();

    if let Some(id) = hospital_id {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"hospital_id\"\r\n\r\n{id}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, content)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: text/csv\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Workflow helpers
// ---------------------------------------------------------------------------

/// Register a hospital through the API and return its id.
pub async fn register(app: &TestApp, name: &str) -> i64 {
    let body = serde_json::json!({
        "username": name,
        "email": format!("{}@example.org", name.to_lowercase()),
        "password": "hospital-pass",
        "address": "1 Main Street",
        "contact_number": "555-0100",
    });
    let response = post_json(app.app(), "/register_hospital", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["hospital_id"]
        .as_i64()
        .expect("hospital_id should be an integer")
}

pub async fn upload_sample(app: &TestApp, hospital_id: i64) -> Response<Body> {
    post_multipart(
        app.app(),
        "/upload_dataset",
        Some(&hospital_id.to_string()),
        Some(("patients.csv", SAMPLE_CSV.as_bytes())),
    )
    .await
}

pub async fn upload_slow(app: &TestApp, hospital_id: i64) {
    let response = post_multipart(
        app.app(),
        "/upload_dataset",
        Some(&hospital_id.to_string()),
        Some(("large.csv", slow_csv().as_bytes())),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
}

/// Poll until the hospital's training slot is taken.
pub async fn wait_until_running(app: &TestApp, hospital_id: i64) {
    for _ in 0..500 {
        if app.state.training_locks.is_running(hospital_id) {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    panic!("training for hospital {hospital_id} never started");
}

/// Poll until the hospital's training slot is free again.
pub async fn wait_until_idle(app: &TestApp, hospital_id: i64) {
    for _ in 0..1000 {
        if !app.state.training_locks.is_running(hospital_id) {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("training for hospital {hospital_id} never released its slot");
}

pub async fn train(app: &TestApp, hospital_id: i64) -> Response<Body> {
    post_json(
        app.app(),
        "/train_model",
        serde_json::json!({ "hospital_id": hospital_id }),
    )
    .await
}

pub async fn send(app: &TestApp, hospital_id: i64) -> Response<Body> {
    post_json(
        app.app(),
        "/send_weights",
        serde_json::json!({ "hospital_id": hospital_id }),
    )
    .await
}

/// Log in as the provisioned operator and return the bearer token.
pub async fn central_token(app: &TestApp) -> String {
    let response = post_json(
        app.app(),
        "/login_central",
        serde_json::json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["token"]
        .as_str()
        .expect("token should be a string")
        .to_string()
}
