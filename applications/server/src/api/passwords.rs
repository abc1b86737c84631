/// Password API routes
use crate::{error::Result, state::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use im_core::types::{ComparePasswordResponse, ModifyPasswordResponse, PasswordRequest, UserId};

/// POST /api/users/:id/password/compare
pub async fn compare_password(
    Path(user_id): Path<UserId>,
    State(app_state): State<AppState>,
    Json(req): Json<PasswordRequest>,
) -> Result<Json<ComparePasswordResponse>> {
    let ok = app_state
        .manager
        .compare_password(&user_id, &req.password)
        .await?;
    Ok(Json(ComparePasswordResponse { ok }))
}

/// PUT /api/users/:id/password
pub async fn modify_password(
    Path(user_id): Path<UserId>,
    State(app_state): State<AppState>,
    Json(req): Json<PasswordRequest>,
) -> Result<Json<ModifyPasswordResponse>> {
    let user_id = app_state
        .manager
        .modify_password(&user_id, &req.password)
        .await?;
    Ok(Json(ModifyPasswordResponse { user_id }))
}
