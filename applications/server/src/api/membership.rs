/// Group membership API routes
use crate::{error::Result, state::AppState};
use axum::{extract::State, Json};
use im_core::types::{MembershipRequest, MembershipResponse};

/// POST /api/membership/join
/// Bind every listed user to every listed group, all or nothing
pub async fn join_group(
    State(app_state): State<AppState>,
    Json(req): Json<MembershipRequest>,
) -> Result<Json<MembershipResponse>> {
    let response = app_state.manager.join_group(req).await?;
    Ok(Json(response))
}

/// POST /api/membership/leave
pub async fn leave_group(
    State(app_state): State<AppState>,
    Json(req): Json<MembershipRequest>,
) -> Result<Json<MembershipResponse>> {
    let response = app_state.manager.leave_group(req).await?;
    Ok(Json(response))
}
