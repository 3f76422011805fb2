use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::ProjectMessage;
use crate::error::ApiError;
use crate::filter::ListQuery;
use crate::handlers::protected::access;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathParam, QueryParams};
use crate::services::message_service::MESSAGE_ORDER_COLUMNS;
use crate::state::AppState;
use crate::types::NotificationKind;
use crate::validation::{Validate, Validator, MAX_BODY_LEN};

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub body: String,
}

impl Validate for PostMessageRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new().required_text("body", &self.body, MAX_BODY_LEN).finish()
    }
}

/// GET /api/projects/:id/messages - oldest first
pub async fn messages_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(project_id): PathParam<Uuid>,
    QueryParams(list): QueryParams<ListQuery>,
) -> ApiResult<Vec<ProjectMessage>> {
    let project = state.projects().get(project_id).await?;
    access::project_access(&state, &auth, &project)
        .await?
        .require_contribute()?;

    let clause = list.resolve(MESSAGE_ORDER_COLUMNS, "created_at asc")?;
    let messages = state.messages().list(project_id, &clause).await?;
    Ok(ApiResponse::success(messages))
}

/// POST /api/projects/:id/messages - notifies the project's team, minus the author
pub async fn messages_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(project_id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<PostMessageRequest>,
) -> ApiResult<ProjectMessage> {
    payload.validate()?;

    let project = state.projects().get(project_id).await?;
    access::project_access(&state, &auth, &project)
        .await?
        .require_contribute()?;

    let message = state
        .messages()
        .post(project_id, auth.id, payload.body.trim())
        .await?;

    let mut recipients = match project.team_id {
        Some(team_id) => state.teams().member_ids(team_id).await?,
        None => Vec::new(),
    };
    if !recipients.contains(&project.owner_id) {
        recipients.push(project.owner_id);
    }
    recipients.retain(|id| *id != auth.id);

    let text = format!("{} posted in '{}'", message.author_name, project.name);
    let link = format!("/projects/{}", project_id);
    state
        .notifications()
        .notify_best_effort(&recipients, NotificationKind::Message, &text, Some(&link))
        .await;

    Ok(ApiResponse::created(message))
}
