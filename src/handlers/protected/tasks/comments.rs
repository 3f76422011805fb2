use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::TaskComment;
use crate::error::ApiError;
use crate::filter::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathParam, QueryParams};
use crate::services::task_service::COMMENT_ORDER_COLUMNS;
use crate::state::AppState;
use crate::validation::{Validate, Validator, MAX_BODY_LEN};

use super::task::load_task;

#[derive(Debug, Deserialize)]
pub struct PostCommentRequest {
    pub body: String,
}

impl Validate for PostCommentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new().required_text("body", &self.body, MAX_BODY_LEN).finish()
    }
}

/// GET /api/tasks/:id/comments - oldest first
pub async fn comments_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(task_id): PathParam<Uuid>,
    QueryParams(list): QueryParams<ListQuery>,
) -> ApiResult<Vec<TaskComment>> {
    let (_, _, access) = load_task(&state, &auth, task_id).await?;
    access.require_contribute()?;

    let clause = list.resolve(COMMENT_ORDER_COLUMNS, "created_at asc")?;
    let comments = state.tasks().comments(task_id, &clause).await?;
    Ok(ApiResponse::success(comments))
}

/// POST /api/tasks/:id/comments
pub async fn comments_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(task_id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<PostCommentRequest>,
) -> ApiResult<TaskComment> {
    payload.validate()?;

    let (_, _, access) = load_task(&state, &auth, task_id).await?;
    access.require_contribute()?;

    let comment = state
        .tasks()
        .add_comment(task_id, auth.id, payload.body.trim())
        .await?;
    Ok(ApiResponse::created(comment))
}
