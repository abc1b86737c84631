/// User API routes
use crate::{error::Result, state::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use im_core::types::{
    CreateUserRequest, CreateUserResponse, DeleteUsersRequest, DeleteUsersResponse,
    ListResponse, ListUsersRequest, ModifyUserRequest, ModifyUserResponse, User, UserId,
    UserWithGroups,
};

/// POST /api/users
pub async fn create_user(
    State(app_state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>> {
    let response = app_state.manager.create_user(req).await?;
    Ok(Json(response))
}

/// POST /api/users/search
pub async fn search_users(
    State(app_state): State<AppState>,
    Json(req): Json<ListUsersRequest>,
) -> Result<Json<ListResponse<User>>> {
    let page = app_state.manager.list_users(req).await?;
    Ok(Json(page))
}

/// POST /api/users/search/with-groups
pub async fn search_users_with_groups(
    State(app_state): State<AppState>,
    Json(req): Json<ListUsersRequest>,
) -> Result<Json<ListResponse<UserWithGroups>>> {
    let page = app_state.manager.list_users_with_groups(req).await?;
    Ok(Json(page))
}

/// POST /api/users/delete
/// Soft-delete users and drop their memberships
pub async fn delete_users(
    State(app_state): State<AppState>,
    Json(req): Json<DeleteUsersRequest>,
) -> Result<Json<DeleteUsersResponse>> {
    let response = app_state.manager.delete_users(req).await?;
    Ok(Json(response))
}

/// GET /api/users/:id
pub async fn get_user(
    Path(user_id): Path<UserId>,
    State(app_state): State<AppState>,
) -> Result<Json<User>> {
    let user = app_state.manager.get_user(&user_id).await?;
    Ok(Json(user))
}

/// GET /api/users/:id/groups
pub async fn get_user_with_groups(
    Path(user_id): Path<UserId>,
    State(app_state): State<AppState>,
) -> Result<Json<UserWithGroups>> {
    let user = app_state.manager.get_user_with_groups(&user_id).await?;
    Ok(Json(user))
}

/// PATCH /api/users/:id
pub async fn modify_user(
    Path(user_id): Path<UserId>,
    State(app_state): State<AppState>,
    Json(req): Json<ModifyUserRequest>,
) -> Result<Json<ModifyUserResponse>> {
    let response = app_state.manager.modify_user(&user_id, req).await?;
    Ok(Json(response))
}
