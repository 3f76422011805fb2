use axum::{extract::State, Extension};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::Project;
use crate::error::ApiError;
use crate::filter::ListQuery;
use crate::handlers::protected::access;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathParam, QueryParams};
use crate::services::project_service::PROJECT_ORDER_COLUMNS;
use crate::services::{CascadeSummary, NewProject, ProjectChanges, ProjectFilter};
use crate::state::AppState;
use crate::types::{ProjectStatus, Role};
use crate::validation::{normalize_optional, parse_filter, Validate, Validator, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub team_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Validate for CreateProjectRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required_text("name", &self.name, MAX_NAME_LEN)
            .max_len("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)
            .check("end_date", dates_in_order(self.start_date, self.end_date), "End date must not be before start date")
            .finish()
    }
}

/// Absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub team_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Validate for UpdateProjectRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .optional_text("name", self.name.as_deref(), MAX_NAME_LEN)
            .max_len("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)
            .check("end_date", dates_in_order(self.start_date, self.end_date), "End date must not be before start date")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub status: Option<String>,
    pub team_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ProjectDeleted {
    pub id: Uuid,
    pub deleted: CascadeSummary,
}

fn dates_in_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => end >= start,
        _ => true,
    }
}

/// GET /api/projects?status=&team_id=
pub async fn projects_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    QueryParams(query): QueryParams<ProjectListQuery>,
    QueryParams(list): QueryParams<ListQuery>,
) -> ApiResult<Vec<Project>> {
    let clause = list.resolve(PROJECT_ORDER_COLUMNS, "created_at desc")?;
    let filter = ProjectFilter {
        status: parse_filter("status", query.status.as_deref())?,
        team_id: query.team_id,
        visible_to: if auth.is_staff() { None } else { Some(auth.id) },
    };

    let projects = state.projects().list(&filter, &clause).await?;
    Ok(ApiResponse::success(projects))
}

/// POST /api/projects - the caller becomes the owner
pub async fn projects_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(payload): JsonBody<CreateProjectRequest>,
) -> ApiResult<Project> {
    auth.require_role(&[Role::Admin, Role::Manager])?;
    payload.validate()?;

    if let Some(team_id) = payload.team_id {
        state.teams().get(team_id).await?;
    }

    let project = state
        .projects()
        .create(&NewProject {
            name: payload.name.trim().to_string(),
            description: normalize_optional(payload.description.as_deref()),
            status: payload.status.unwrap_or(ProjectStatus::Planning),
            owner_id: auth.id,
            team_id: payload.team_id,
            start_date: payload.start_date,
            end_date: payload.end_date,
        })
        .await?;

    tracing::info!("Project '{}' created by {}", project.name, auth.email);
    Ok(ApiResponse::created(project))
}

/// GET /api/projects/:id
pub async fn project_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Project> {
    let project = state.projects().get(id).await?;
    access::project_access(&state, &auth, &project)
        .await?
        .require_contribute()?;
    Ok(ApiResponse::success(project))
}

/// PATCH /api/projects/:id
pub async fn project_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateProjectRequest>,
) -> ApiResult<Project> {
    payload.validate()?;

    let project = state.projects().get(id).await?;
    if !access::can_manage(&auth, &project) {
        return Err(ApiError::forbidden("Only managers or the project owner can do this"));
    }

    // The stored dates count when only one side changes
    let start = payload.start_date.or(project.start_date);
    let end = payload.end_date.or(project.end_date);
    if !dates_in_order(start, end) {
        return Err(ApiError::invalid_field("end_date", "End date must not be before start date"));
    }

    if let Some(team_id) = payload.team_id {
        state.teams().get(team_id).await?;
    }
    if let Some(owner_id) = payload.owner_id {
        state.users().get(owner_id).await?;
    }

    let changes = ProjectChanges {
        name: payload.name.as_deref().map(|n| n.trim().to_string()),
        description: payload.description,
        status: payload.status,
        team_id: payload.team_id,
        owner_id: payload.owner_id,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };
    let project = state.projects().update(id, &changes).await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/projects/:id - admin or owner; removes goals, tasks, comments and messages
pub async fn project_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<ProjectDeleted> {
    let project = state.projects().get(id).await?;
    if !(auth.is_admin() || project.owner_id == auth.id) {
        return Err(ApiError::forbidden("Only an admin or the project owner can delete a project"));
    }

    let deleted = state.projects().delete_cascade(id).await?;
    tracing::info!("Project {} deleted by {}", id, auth.email);
    Ok(ApiResponse::success(ProjectDeleted { id, deleted }))
}
