/// Group API routes
use crate::{error::Result, state::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use im_core::types::{
    CreateGroupRequest, CreateGroupResponse, DeleteGroupsRequest, DeleteGroupsResponse, Group,
    GroupId, GroupWithUsers, ListGroupsRequest, ListResponse, ModifyGroupRequest,
    ModifyGroupResponse,
};

/// POST /api/groups
pub async fn create_group(
    State(app_state): State<AppState>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<Json<CreateGroupResponse>> {
    let response = app_state.manager.create_group(req).await?;
    Ok(Json(response))
}

/// POST /api/groups/search
pub async fn search_groups(
    State(app_state): State<AppState>,
    Json(req): Json<ListGroupsRequest>,
) -> Result<Json<ListResponse<Group>>> {
    let page = app_state.manager.list_groups(req).await?;
    Ok(Json(page))
}

/// POST /api/groups/search/with-users
pub async fn search_groups_with_users(
    State(app_state): State<AppState>,
    Json(req): Json<ListGroupsRequest>,
) -> Result<Json<ListResponse<GroupWithUsers>>> {
    let page = app_state.manager.list_groups_with_users(req).await?;
    Ok(Json(page))
}

/// POST /api/groups/delete
/// Soft-delete groups that have no active sub-groups and no members
pub async fn delete_groups(
    State(app_state): State<AppState>,
    Json(req): Json<DeleteGroupsRequest>,
) -> Result<Json<DeleteGroupsResponse>> {
    let response = app_state.manager.delete_groups(req).await?;
    Ok(Json(response))
}

/// GET /api/groups/:id
pub async fn get_group(
    Path(group_id): Path<GroupId>,
    State(app_state): State<AppState>,
) -> Result<Json<Group>> {
    let group = app_state.manager.get_group(&group_id).await?;
    Ok(Json(group))
}

/// GET /api/groups/:id/users
pub async fn get_group_with_users(
    Path(group_id): Path<GroupId>,
    State(app_state): State<AppState>,
) -> Result<Json<GroupWithUsers>> {
    let group = app_state.manager.get_group_with_users(&group_id).await?;
    Ok(Json(group))
}

/// PATCH /api/groups/:id
/// Empty fields are left unchanged; a new parent moves the whole subtree
pub async fn modify_group(
    Path(group_id): Path<GroupId>,
    State(app_state): State<AppState>,
    Json(req): Json<ModifyGroupRequest>,
) -> Result<Json<ModifyGroupResponse>> {
    let response = app_state.manager.modify_group(&group_id, req).await?;
    Ok(Json(response))
}
