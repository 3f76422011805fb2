use axum::{extract::State, Extension};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::Goal;
use crate::error::ApiError;
use crate::filter::ListQuery;
use crate::handlers::protected::access;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathParam, QueryParams};
use crate::services::goal_service::GOAL_ORDER_COLUMNS;
use crate::state::AppState;
use crate::types::GoalStatus;
use crate::validation::{normalize_optional, parse_filter, Validate, Validator, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<GoalStatus>,
    pub deadline: Option<NaiveDate>,
}

impl Validate for CreateGoalRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required_text("title", &self.title, MAX_NAME_LEN)
            .max_len("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct GoalListQuery {
    pub status: Option<String>,
}

/// GET /api/projects/:id/goals
pub async fn project_goals_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(project_id): PathParam<Uuid>,
    QueryParams(query): QueryParams<GoalListQuery>,
    QueryParams(list): QueryParams<ListQuery>,
) -> ApiResult<Vec<Goal>> {
    let project = state.projects().get(project_id).await?;
    access::project_access(&state, &auth, &project)
        .await?
        .require_contribute()?;

    let clause = list.resolve(GOAL_ORDER_COLUMNS, "created_at asc")?;
    let status = parse_filter("status", query.status.as_deref())?;
    let goals = state.goals().list_for_project(project_id, status, &clause).await?;
    Ok(ApiResponse::success(goals))
}

/// POST /api/projects/:id/goals
pub async fn project_goals_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(project_id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<CreateGoalRequest>,
) -> ApiResult<Goal> {
    payload.validate()?;

    let project = state.projects().get(project_id).await?;
    access::project_access(&state, &auth, &project)
        .await?
        .require_manage()?;

    let description = normalize_optional(payload.description.as_deref());
    let goal = state
        .goals()
        .create(
            project_id,
            payload.title.trim(),
            description.as_deref(),
            payload.status.unwrap_or(GoalStatus::NotStarted),
            payload.deadline,
        )
        .await?;
    Ok(ApiResponse::created(goal))
}
