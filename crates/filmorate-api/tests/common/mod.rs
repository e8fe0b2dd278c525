//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use filmorate_api::app;
use filmorate_api::state::AppState;
use filmorate_core::clock::Clock;
use filmorate_store::memory::MemoryBackend;
use filmorate_store::postgres::PgBackend;
use filmorate_test_support::SteppingClock;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// A clock starting at 2026-01-15T10:00:00Z that ticks one second per read,
/// so feed order is deterministic.
fn stepping_clock() -> Arc<dyn Clock> {
    Arc::new(SteppingClock::new(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
        chrono::Duration::seconds(1),
    ))
}

/// Build the full app router over PostgreSQL. Uses the same route structure
/// as `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    app(AppState::postgres(PgBackend::new(pool), stepping_clock()))
}

/// Build the full app router over the in-memory stores.
pub fn build_memory_app() -> Router {
    app(AppState::in_memory(MemoryBackend::open(), stepping_clock()))
}

/// Inserts users `1..=users` and films `1..=films` into the catalog tables.
pub async fn seed(pool: &PgPool, users: i64, films: i64) {
    for id in 1..=users {
        sqlx::query("INSERT INTO users (user_id, email, login) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(format!("user{id}@example.com"))
            .bind(format!("user{id}"))
            .execute(pool)
            .await
            .unwrap();
    }
    for id in 1..=films {
        sqlx::query("INSERT INTO films (film_id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(format!("Film {id}"))
            .execute(pool)
            .await
            .unwrap();
    }
}

/// Send a request with an optional JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, Some(body)).await
}

/// Send a PUT request without a body and return the response.
pub async fn put(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_json(app, "PUT", uri, None).await
}

/// Send a DELETE request and return the response.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_json(app, "DELETE", uri, None).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_json(app, "GET", uri, None).await
}
