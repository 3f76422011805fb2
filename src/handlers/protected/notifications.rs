use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::Notification;
use crate::filter::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PathParam, QueryParams};
use crate::services::notification_service::NOTIFICATION_ORDER_COLUMNS;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub unread: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

/// GET /api/notifications?unread=true - newest first
pub async fn notifications_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    QueryParams(query): QueryParams<NotificationQuery>,
    QueryParams(list): QueryParams<ListQuery>,
) -> ApiResult<Vec<Notification>> {
    let clause = list.resolve(NOTIFICATION_ORDER_COLUMNS, "created_at desc")?;
    let notifications = state
        .notifications()
        .list(auth.id, query.unread.unwrap_or(false), &clause)
        .await?;
    Ok(ApiResponse::success(notifications))
}

/// PATCH /api/notifications/:id/read
pub async fn notification_read_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<Notification> {
    let notification = state.notifications().mark_read(id, auth.id).await?;
    Ok(ApiResponse::success(notification))
}

/// POST /api/notifications/read-all
pub async fn notifications_read_all_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<MarkedRead> {
    let updated = state.notifications().mark_all_read(auth.id).await?;
    Ok(ApiResponse::success(MarkedRead { updated }))
}

/// DELETE /api/notifications/:id
pub async fn notification_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<()> {
    state.notifications().delete(id, auth.id).await?;
    Ok(ApiResponse::no_content())
}
