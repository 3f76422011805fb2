use axum::{extract::State, Extension};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::Task;
use crate::error::ApiError;
use crate::filter::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathParam, QueryParams};
use crate::services::task_service::TASK_ORDER_COLUMNS;
use crate::services::{NewTask, TaskFilter};
use crate::state::AppState;
use crate::types::{NotificationKind, TaskPriority, TaskStatus};
use crate::validation::{normalize_optional, Validate, Validator, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

use super::goal::load_goal;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

impl Validate for CreateTaskRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required_text("title", &self.title, MAX_NAME_LEN)
            .max_len("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)
            .finish()
    }
}

/// GET /api/goals/:id/tasks
pub async fn goal_tasks_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(goal_id): PathParam<Uuid>,
    QueryParams(list): QueryParams<ListQuery>,
) -> ApiResult<Vec<Task>> {
    let (_, _, access) = load_goal(&state, &auth, goal_id).await?;
    access.require_contribute()?;

    let clause = list.resolve(TASK_ORDER_COLUMNS, "created_at asc")?;
    let filter = TaskFilter {
        goal_id: Some(goal_id),
        ..Default::default()
    };
    let tasks = state.tasks().list(&filter, &clause).await?;
    Ok(ApiResponse::success(tasks))
}

/// POST /api/goals/:id/tasks - notifies the assignee, if any
pub async fn goal_tasks_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(goal_id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<CreateTaskRequest>,
) -> ApiResult<Task> {
    payload.validate()?;

    let (_, project, access) = load_goal(&state, &auth, goal_id).await?;
    access.require_contribute()?;

    if let Some(assignee_id) = payload.assignee_id {
        if state.users().find_by_id(assignee_id).await?.is_none() {
            return Err(ApiError::invalid_field("assignee_id", "User not found"));
        }
    }

    let task = state
        .tasks()
        .create(&NewTask {
            goal_id,
            title: payload.title.trim().to_string(),
            description: normalize_optional(payload.description.as_deref()),
            assignee_id: payload.assignee_id,
            priority: payload.priority.unwrap_or(TaskPriority::Medium),
            status: payload.status.unwrap_or(TaskStatus::Todo),
            due_date: payload.due_date,
        })
        .await?;

    if let Some(assignee_id) = task.assignee_id.filter(|id| *id != auth.id) {
        let message = format!("You were assigned '{}' in '{}'", task.title, project.name);
        let link = format!("/tasks/{}", task.id);
        state
            .notifications()
            .notify_best_effort(&[assignee_id], NotificationKind::Task, &message, Some(&link))
            .await;
    }

    Ok(ApiResponse::created(task))
}
