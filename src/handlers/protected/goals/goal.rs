use axum::{extract::State, Extension};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Goal, Project};
use crate::error::ApiError;
use crate::handlers::protected::access::{self, ProjectAccess};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathParam};
use crate::services::{CascadeSummary, GoalChanges};
use crate::state::AppState;
use crate::types::GoalStatus;
use crate::validation::{Validate, Validator, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

/// Absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<GoalStatus>,
    pub deadline: Option<NaiveDate>,
}

impl Validate for UpdateGoalRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .optional_text("title", self.title.as_deref(), MAX_NAME_LEN)
            .max_len("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct GoalDeleted {
    pub id: Uuid,
    pub deleted: CascadeSummary,
}

/// Goal plus the caller's rights on its project
pub(crate) async fn load_goal(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
) -> Result<(Goal, Project, ProjectAccess), ApiError> {
    let goal = state.goals().get(id).await?;
    let project = state.projects().get(goal.project_id).await?;
    let access = access::project_access(state, auth, &project).await?;
    Ok((goal, project, access))
}

/// GET /api/goals/:id
pub async fn goal_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Goal> {
    let (goal, _, access) = load_goal(&state, &auth, id).await?;
    access.require_contribute()?;
    Ok(ApiResponse::success(goal))
}

/// PATCH /api/goals/:id
pub async fn goal_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateGoalRequest>,
) -> ApiResult<Goal> {
    payload.validate()?;
    let (_, _, access) = load_goal(&state, &auth, id).await?;
    access.require_manage()?;

    let changes = GoalChanges {
        title: payload.title.as_deref().map(|t| t.trim().to_string()),
        description: payload.description,
        status: payload.status,
        deadline: payload.deadline,
    };
    let goal = state.goals().update(id, &changes).await?;
    Ok(ApiResponse::success(goal))
}

/// DELETE /api/goals/:id - removes its tasks and their comments
pub async fn goal_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<GoalDeleted> {
    let (_, _, access) = load_goal(&state, &auth, id).await?;
    access.require_manage()?;

    let deleted = state.goals().delete_cascade(id).await?;
    Ok(ApiResponse::success(GoalDeleted { id, deleted }))
}
