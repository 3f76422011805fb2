use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Team, TeamMember};
use crate::error::ApiError;
use crate::filter::ListQuery;
use crate::handlers::protected::access;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathParam, QueryParams};
use crate::services::team_service::TEAM_ORDER_COLUMNS;
use crate::services::CascadeSummary;
use crate::state::AppState;
use crate::types::Role;
use crate::validation::{normalize_optional, Validate, Validator, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub description: Option<String>,
}

impl Validate for CreateTeamRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required_text("name", &self.name, MAX_NAME_LEN)
            .max_len("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)
            .finish()
    }
}

/// Absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Validate for UpdateTeamRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .optional_text("name", self.name.as_deref(), MAX_NAME_LEN)
            .max_len("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Serialize)]
pub struct TeamDeleted {
    pub id: Uuid,
    pub deleted: CascadeSummary,
}

/// GET /api/teams - staff see every team, members only their own
pub async fn teams_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    QueryParams(list): QueryParams<ListQuery>,
) -> ApiResult<Vec<Team>> {
    let clause = list.resolve(TEAM_ORDER_COLUMNS, "name asc")?;
    let member_of = if auth.is_staff() { None } else { Some(auth.id) };
    let teams = state.teams().list(member_of, &clause).await?;
    Ok(ApiResponse::success(teams))
}

/// POST /api/teams - create a team; the creator becomes its lead
pub async fn teams_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<CreateTeamRequest>,
) -> ApiResult<Team> {
    auth.require_role(&[Role::Admin, Role::Manager])?;
    payload.validate()?;

    let description = normalize_optional(payload.description.as_deref());
    let team = state
        .teams()
        .create(payload.name.trim(), description.as_deref(), auth.id)
        .await?;

    tracing::info!("Team '{}' created by {}", team.name, auth.email);
    Ok(ApiResponse::created(team))
}

/// GET /api/teams/:id - team with its members
pub async fn team_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<TeamDetail> {
    let team = state.teams().get(id).await?;
    access::require_team_visible(&state, &auth, id).await?;

    let members = state.teams().members(id).await?;
    Ok(ApiResponse::success(TeamDetail { team, members }))
}

/// PATCH /api/teams/:id
pub async fn team_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateTeamRequest>,
) -> ApiResult<Team> {
    payload.validate()?;
    state.teams().get(id).await?;
    access::require_team_manager(&state, &auth, id).await?;

    let name = payload.name.as_deref().map(str::trim);
    let team = state
        .teams()
        .update(id, name, payload.description.as_deref())
        .await?;
    Ok(ApiResponse::success(team))
}

/// DELETE /api/teams/:id - removes the team, its projects and everything under them
pub async fn team_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<TeamDeleted> {
    auth.require_role(&[Role::Admin, Role::Manager])?;

    let deleted = state.teams().delete_cascade(id).await?;
    Ok(ApiResponse::success(TeamDeleted { id, deleted }))
}
