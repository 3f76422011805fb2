use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::User;
use crate::error::ApiError;
use crate::filter::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathParam, QueryParams};
use crate::services::user_service::USER_ORDER_COLUMNS;
use crate::services::{UserChanges, UserFilter};
use crate::state::AppState;
use crate::types::{NotificationKind, Role};
use crate::validation::{parse_filter, Validate, Validator, MAX_NAME_LEN};

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub approved: Option<bool>,
    pub role: Option<String>,
}

/// Absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_approved: Option<bool>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .optional_text("name", self.name.as_deref(), MAX_NAME_LEN)
            .finish()
    }
}

impl UpdateUserRequest {
    /// Admins may not lock themselves out
    fn check_self_update(&self) -> Result<(), ApiError> {
        if self.role.is_some_and(|role| role != Role::Admin) {
            return Err(ApiError::bad_request("You cannot change your own role"));
        }
        if self.is_approved == Some(false) {
            return Err(ApiError::bad_request("You cannot revoke your own approval"));
        }
        Ok(())
    }
}

/// GET /api/admin/users?approved=&role=
pub async fn users_get(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<UserQuery>,
    QueryParams(list): QueryParams<ListQuery>,
) -> ApiResult<Vec<User>> {
    let clause = list.resolve(USER_ORDER_COLUMNS, "created_at desc")?;
    let filter = UserFilter {
        is_approved: query.approved,
        role: parse_filter("role", query.role.as_deref())?,
    };

    let users = state.users().list(&filter, &clause).await?;
    Ok(ApiResponse::success(users))
}

/// PATCH /api/admin/users/:id - approving a user notifies them
pub async fn user_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> ApiResult<User> {
    payload.validate()?;
    if id == auth.id {
        payload.check_self_update()?;
    }

    let before = state.users().get(id).await?;
    let changes = UserChanges {
        name: payload.name.as_deref().map(|n| n.trim().to_string()),
        role: payload.role,
        is_approved: payload.is_approved,
    };
    let user = state.users().update(id, &changes).await?;

    if user.is_approved && !before.is_approved {
        tracing::info!("User {} approved by {}", user.email, auth.email);
        state
            .notifications()
            .notify_best_effort(
                &[user.id],
                NotificationKind::Approval,
                "Your account has been approved. Welcome aboard!",
                Some("/dashboard"),
            )
            .await;
    }

    Ok(ApiResponse::success(user))
}

/// DELETE /api/admin/users/:id
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<()> {
    if id == auth.id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    state.users().delete(id).await?;
    tracing::info!("User {} deleted by {}", id, auth.email);
    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: Option<Role>, is_approved: Option<bool>) -> UpdateUserRequest {
        UpdateUserRequest {
            name: None,
            role,
            is_approved,
        }
    }

    #[test]
    fn admin_cannot_demote_or_unapprove_self() {
        assert!(request(Some(Role::Member), None).check_self_update().is_err());
        assert!(request(None, Some(false)).check_self_update().is_err());
        assert!(request(Some(Role::Admin), Some(true)).check_self_update().is_ok());
        assert!(request(None, None).check_self_update().is_ok());
    }
}
