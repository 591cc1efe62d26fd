use std::str::FromStr;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use tradejournal::api::router::create_router;
use tradejournal::config::AppConfig;
use tradejournal::AppState;

/// Connect to the test database and run all migrations.
///
/// Returns `None` when `TEST_DATABASE_URL` is not set so database-backed
/// tests can be skipped on machines without Postgres.
#[allow(dead_code)]
pub async fn setup_test_db() -> Option<PgPool> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    tradejournal::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

#[allow(dead_code)]
pub async fn build_test_app() -> Option<(Router, PgPool)> {
    let pool = setup_test_db().await?;
    let url = std::env::var("TEST_DATABASE_URL").unwrap_or_default();

    let state = AppState {
        db: pool.clone(),
        config: AppConfig::for_database(url),
        metrics_handle: tradejournal::metrics::detached_handle(),
    };

    Some((create_router(state), pool))
}

/// Issue a JSON request and decode the JSON response body.
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Register a fresh user and log in. Returns the session token.
#[allow(dead_code)]
pub async fn login_new_user(app: &Router) -> String {
    let username = format!("trader_{}", &Uuid::new_v4().simple().to_string()[..12]);
    let creds = serde_json::json!({ "username": username, "password": "Journal2024" });

    let (status, _) = send(app, Method::POST, "/api/auth/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(app, Method::POST, "/api/auth/login", None, Some(creds)).await;
    assert_eq!(status, StatusCode::OK);
    json["data"]["token"].as_str().unwrap().to_string()
}

/// Create a setup and return its id.
#[allow(dead_code)]
pub async fn create_setup(app: &Router, token: &str, name: &str) -> String {
    let (status, json) = send(
        app,
        Method::POST,
        "/api/setups",
        Some(token),
        Some(serde_json::json!({ "name": name, "strategy": "breakout" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["data"]["id"].as_str().unwrap().to_string()
}

/// Read a decimal that the API serialized as a string.
#[allow(dead_code)]
pub fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal serialized as string")).unwrap()
}
