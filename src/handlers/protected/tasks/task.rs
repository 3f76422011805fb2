use axum::{extract::State, Extension};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Project, Task};
use crate::error::ApiError;
use crate::filter::ListQuery;
use crate::handlers::protected::access::{self, ProjectAccess};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathParam, QueryParams};
use crate::services::task_service::TASK_ORDER_COLUMNS;
use crate::services::{CascadeSummary, TaskChanges, TaskFilter};
use crate::state::AppState;
use crate::types::{NotificationKind, TaskPriority, TaskStatus};
use crate::validation::{parse_filter, Validate, Validator, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub mine: Option<bool>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub goal_id: Option<Uuid>,
}

/// Absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

impl Validate for UpdateTaskRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .optional_text("title", self.title.as_deref(), MAX_NAME_LEN)
            .max_len("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct TaskDeleted {
    pub id: Uuid,
    pub deleted: CascadeSummary,
}

pub(crate) async fn load_task(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
) -> Result<(Task, Project, ProjectAccess), ApiError> {
    let task = state.tasks().get(id).await?;
    let (project, access) = access::task_access(state, auth, &task).await?;
    Ok((task, project, access))
}

/// GET /api/tasks?mine=&status=&priority=&goal_id=
///
/// Staff see every task; everyone else sees tasks assigned to them or in
/// projects they can contribute to.
pub async fn tasks_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    QueryParams(query): QueryParams<TaskQuery>,
    QueryParams(list): QueryParams<ListQuery>,
) -> ApiResult<Vec<Task>> {
    let clause = list.resolve(TASK_ORDER_COLUMNS, "created_at desc")?;
    let filter = TaskFilter {
        goal_id: query.goal_id,
        assignee_id: query.mine.unwrap_or(false).then_some(auth.id),
        status: parse_filter("status", query.status.as_deref())?,
        priority: parse_filter("priority", query.priority.as_deref())?,
        visible_to: if auth.is_staff() { None } else { Some(auth.id) },
    };

    let tasks = state.tasks().list(&filter, &clause).await?;
    Ok(ApiResponse::success(tasks))
}

/// GET /api/tasks/:id
pub async fn task_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Task> {
    let (task, _, access) = load_task(&state, &auth, id).await?;
    access.require_contribute()?;
    Ok(ApiResponse::success(task))
}

/// PATCH /api/tasks/:id - reassigning notifies the new assignee
pub async fn task_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateTaskRequest>,
) -> ApiResult<Task> {
    payload.validate()?;

    let (before, project, access) = load_task(&state, &auth, id).await?;
    access.require_contribute()?;

    if let Some(assignee_id) = payload.assignee_id {
        if state.users().find_by_id(assignee_id).await?.is_none() {
            return Err(ApiError::invalid_field("assignee_id", "User not found"));
        }
    }

    let changes = TaskChanges {
        title: payload.title.as_deref().map(|t| t.trim().to_string()),
        description: payload.description,
        assignee_id: payload.assignee_id,
        priority: payload.priority,
        status: payload.status,
        due_date: payload.due_date,
    };
    let task = state.tasks().update(id, &changes).await?;

    let reassigned = task.assignee_id.filter(|new| before.assignee_id != Some(*new) && *new != auth.id);
    if let Some(assignee_id) = reassigned {
        let message = format!("You were assigned '{}' in '{}'", task.title, project.name);
        let link = format!("/tasks/{}", task.id);
        state
            .notifications()
            .notify_best_effort(&[assignee_id], NotificationKind::Task, &message, Some(&link))
            .await;
    }

    Ok(ApiResponse::success(task))
}

/// DELETE /api/tasks/:id - removes its comments too
pub async fn task_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<TaskDeleted> {
    let (_, _, access) = load_task(&state, &auth, id).await?;
    access.require_manage()?;

    let deleted = state.tasks().delete_cascade(id).await?;
    Ok(ApiResponse::success(TaskDeleted { id, deleted }))
}
