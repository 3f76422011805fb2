use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::TeamMember;
use crate::handlers::protected::access;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathParam, QueryParams};
use crate::state::AppState;
use crate::types::{NotificationKind, TeamRole};

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub role: Option<TeamRole>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    pub user_id: Uuid,
    pub role: TeamRole,
}

#[derive(Debug, Deserialize)]
pub struct RemoveMemberQuery {
    pub user_id: Uuid,
}

/// GET /api/teams/:id/members
pub async fn members_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(team_id): PathParam<Uuid>,
) -> ApiResult<Vec<TeamMember>> {
    state.teams().get(team_id).await?;
    access::require_team_visible(&state, &auth, team_id).await?;

    let members = state.teams().members(team_id).await?;
    Ok(ApiResponse::success(members))
}

/// POST /api/teams/:id/members - add a user and tell them about it
pub async fn member_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(team_id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<AddMemberRequest>,
) -> ApiResult<TeamMember> {
    let team = state.teams().get(team_id).await?;
    access::require_team_manager(&state, &auth, team_id).await?;
    state.users().get(payload.user_id).await?;

    let role = payload.role.unwrap_or(TeamRole::Member);
    let member = state.teams().add_member(team_id, payload.user_id, role).await?;

    let message = format!("You were added to team '{}' as {}", team.name, role);
    let link = format!("/teams/{}", team_id);
    state
        .notifications()
        .notify_best_effort(&[payload.user_id], NotificationKind::Team, &message, Some(&link))
        .await;

    Ok(ApiResponse::created(member))
}

/// PATCH /api/teams/:id/members - change a member's role
pub async fn member_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(team_id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateMemberRequest>,
) -> ApiResult<TeamMember> {
    state.teams().get(team_id).await?;
    access::require_team_manager(&state, &auth, team_id).await?;

    let member = state
        .teams()
        .update_member(team_id, payload.user_id, payload.role)
        .await?;
    Ok(ApiResponse::success(member))
}

/// DELETE /api/teams/:id/members?user_id=
pub async fn member_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(team_id): PathParam<Uuid>,
    QueryParams(query): QueryParams<RemoveMemberQuery>,
) -> ApiResult<()> {
    state.teams().get(team_id).await?;
    access::require_team_manager(&state, &auth, team_id).await?;

    state.teams().remove_member(team_id, query.user_id).await?;
    Ok(ApiResponse::no_content())
}
