//! Common test utilities and fixtures
#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use im_server::{create_router, services::BcryptPasswordHasher, state::AppState};
use im_storage::SqliteIdentityStore;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

/// Lowest bcrypt cost keeps tests fast
pub const TEST_BCRYPT_COST: u32 = 4;

/// Create a router backed by a fresh temp-file database
///
/// The returned `TempDir` must outlive the router.
pub async fn create_test_app() -> Result<(Router, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());

    let pool = im_storage::create_pool(&db_url, 5).await?;
    im_storage::run_migrations(&pool).await?;

    let hasher = BcryptPasswordHasher::new(TEST_BCRYPT_COST);
    let store = SqliteIdentityStore::new(pool, Arc::new(hasher));
    let app = create_router(AppState::new(Arc::new(store)));

    Ok((app, temp_dir))
}

/// Send a request and decode the JSON response body
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

/// Create a group over HTTP and return its id
pub async fn create_group(app: &Router, parent: &str, name: &str) -> String {
    let (status, body) = post(
        app,
        "/api/groups",
        serde_json::json!({ "parent_group_id": parent, "group_name": name }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create group failed: {body}");
    body["group_id"].as_str().unwrap().to_string()
}

/// Create a user over HTTP and return its id
pub async fn create_user(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = post(
        app,
        "/api/users",
        serde_json::json!({ "username": username, "password": password }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create user failed: {body}");
    body["user_id"].as_str().unwrap().to_string()
}
