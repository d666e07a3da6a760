//! Test utilities and common setup.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use koyn::api::{self, AppState};
use koyn::config::AppConfig;
use koyn::db::Database;
use koyn::exchange::{ExchangeApi, ExchangeApiError, WalletBalance};
use koyn::user::SignupRequest;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

/// Stub venue: accepts every key pair and reports one BTC balance.
struct StubExchange;

#[async_trait]
impl ExchangeApi for StubExchange {
    async fn validate_keys(&self, _: &str, _: &str) -> Result<bool, ExchangeApiError> {
        Ok(true)
    }

    async fn balances(&self, _: &str, _: &str) -> Result<Vec<WalletBalance>, ExchangeApiError> {
        Ok(vec![WalletBalance {
            currency: "BTC".to_string(),
            balance: "0.5".to_string(),
            locked: "0".to_string(),
            avg_buy_price: "1000000".to_string(),
            unit_currency: "KRW".to_string(),
        }])
    }
}

/// A wired test application over an in-memory database.
///
/// Keeps the upload tempdir alive for the test's duration and exposes the
/// state so tests can create users and mint credentials directly.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: Database,
    _uploads: tempfile::TempDir,
}

pub async fn test_app() -> TestApp {
    let db = Database::in_memory().await.unwrap();
    let uploads = tempfile::tempdir().unwrap();

    let mut config = AppConfig::default();
    config.auth.secret = Some(TEST_SECRET.to_string());
    config.storage.root = uploads.path().to_path_buf();

    let state = AppState::new(config, &db, TEST_SECRET, Arc::new(StubExchange));

    TestApp {
        router: api::create_router(state.clone()),
        state,
        db,
        _uploads: uploads,
    }
}

/// Sign up a user through the service layer and mint a 30-minute
/// credential for it.
pub async fn signup_with_token(app: &TestApp, email: &str) -> (i64, String) {
    let user = app
        .state
        .users
        .signup(SignupRequest {
            email: email.to_string(),
            password: "password123".to_string(),
            username: format!("user-{email}"),
        })
        .await
        .unwrap();

    let token = app
        .state
        .codec
        .issue(
            user.id,
            &user.email,
            vec![user.role.to_string()],
            chrono::Duration::minutes(30),
        )
        .unwrap();

    (user.id, token)
}

/// Build a request with an optional bearer token and optional JSON body.
pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Build a multipart request for the given text fields and optional file.
pub fn multipart_request(
    method: Method,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Request<Body> {
    const BOUNDARY: &str = "koyn-test-boundary";

    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Run one request and decode the response body as JSON (Null when empty).
pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
