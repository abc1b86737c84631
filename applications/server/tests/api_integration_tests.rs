/// API integration tests
/// Tests complete HTTP request/response cycles with real database
mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_health_and_version() {
    let (app, _temp_dir) = create_test_app().await.unwrap();

    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get(&app, "/api/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], im_core::VERSION);
}

#[tokio::test]
async fn test_group_create_get_and_modify() {
    let (app, _temp_dir) = create_test_app().await.unwrap();
    let root = create_group(&app, "", "engineering").await;
    let child = create_group(&app, &root, "platform").await;

    let (status, body) = get(&app, &format!("/api/groups/{child}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["group_path"], format!("{root}.{child}"));
    assert_eq!(body["group_path_level"], 2);
    assert_eq!(body["status"], "active");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/groups/{child}"),
        Some(json!({ "description": "core services" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, &format!("/api/groups/{child}")).await;
    assert_eq!(body["description"], "core services");
    assert_eq!(body["group_name"], "platform");
}

#[tokio::test]
async fn test_error_kinds_map_to_status_codes() {
    let (app, _temp_dir) = create_test_app().await.unwrap();

    let (status, body) = get(&app, "/api/groups/grp-missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("grp-missing"));

    let (status, _) = post(
        &app,
        "/api/groups",
        json!({ "parent_group_id": "grp-missing", "group_name": "orphan" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let root = create_group(&app, "", "root").await;
    create_group(&app, &root, "child").await;
    let (status, _) = post(&app, "/api/groups/delete", json!({ "group_id": [root] })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_lifecycle_over_http() {
    let (app, _temp_dir) = create_test_app().await.unwrap();
    let user_id = create_user(&app, "alice", "s3cret").await;

    let (status, body) = get(&app, &format!("/api/users/{user_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body.get("password_hash").is_none());

    let (status, body) = post(
        &app,
        &format!("/api/users/{user_id}/password/compare"),
        json!({ "password": "s3cret" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/users/{user_id}/password"),
        Some(json!({ "password": "n3w" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = post(
        &app,
        &format!("/api/users/{user_id}/password/compare"),
        json!({ "password": "s3cret" }),
    )
    .await;
    assert_eq!(body["ok"], false);

    let (status, body) = post(&app, "/api/users/delete", json!({ "user_id": [user_id] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"][0], user_id.as_str());

    let (_, body) = get(&app, &format!("/api/users/{user_id}")).await;
    assert_eq!(body["status"], "deleted");
}

#[tokio::test]
async fn test_duplicate_username_is_bad_request() {
    let (app, _temp_dir) = create_test_app().await.unwrap();
    create_user(&app, "alice", "pw").await;

    let (status, _) = post(
        &app,
        "/api/users",
        json!({ "username": "alice", "password": "pw" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_membership_and_search() {
    let (app, _temp_dir) = create_test_app().await.unwrap();
    let root = create_group(&app, "", "R").await;
    let child = create_group(&app, &root, "C").await;
    let alice = create_user(&app, "alice", "pw").await;
    create_user(&app, "bob", "pw").await;

    let membership = json!({ "group_id": [child], "user_id": [alice] });
    let (status, body) = post(&app, "/api/membership/join", membership.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, membership);

    let (status, _) = post(&app, "/api/membership/join", membership.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Members of the whole subtree under R
    let (status, body) = post(&app, "/api/users/search", json!({ "root_group_id": [root] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["items"][0]["user_id"], alice.as_str());

    let (_, body) = post(&app, "/api/users/search/with-groups", json!({})).await;
    assert_eq!(body["total_count"], 2);

    let (status, body) = get(&app, &format!("/api/groups/{child}/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"][0]["username"], "alice");

    let (status, _) = post(&app, "/api/membership/leave", membership.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(&app, "/api/membership/leave", membership).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get(&app, &format!("/api/users/{alice}/groups")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["groups"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_groups_paging_and_sort_validation() {
    let (app, _temp_dir) = create_test_app().await.unwrap();
    for name in ["a", "b", "c"] {
        create_group(&app, "", name).await;
    }

    let (status, body) = post(
        &app,
        "/api/groups/search",
        json!({ "sort_key": "group_name", "reverse": true, "limit": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 3);
    let names: Vec<_> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["group_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a", "b"]);

    let (status, _) = post(&app, "/api/groups/search", json!({ "sort_key": "bogus" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(&app, "/api/groups/search/with-users", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
}
