use axum::extract::State;
use serde::Deserialize;

use crate::auth::hash_password;
use crate::config;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::NewUser;
use crate::state::AppState;
use crate::types::NotificationKind;
use crate::validation::{Validate, Validator, MAX_NAME_LEN};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required_text("name", &self.name, MAX_NAME_LEN)
            .email("email", &self.email)
            .password("password", &self.password)
            .finish()
    }
}

fn ensure_registration_open(allowed: bool) -> Result<(), ApiError> {
    if allowed {
        Ok(())
    } else {
        Err(ApiError::forbidden("Registration is disabled"))
    }
}

/// POST /api/auth/register - create an account awaiting admin approval
///
/// The first account ever registered becomes an approved admin. Every other
/// account starts as an unapproved member and the admins are notified.
pub async fn register_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<User> {
    ensure_registration_open(config::config().security.allow_registration)?;
    payload.validate()?;

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .users()
        .register(NewUser {
            name: payload.name.trim().to_string(),
            email: payload.email.trim().to_string(),
            password_hash,
        })
        .await?;

    tracing::info!("Registered user {} ({})", user.email, user.id);

    if !user.is_approved {
        let admins = state.users().admin_ids().await?;
        let message = format!("{} ({}) registered and is awaiting approval", user.name, user.email);
        state
            .notifications()
            .notify_best_effort(&admins, NotificationKind::Registration, &message, Some("/admin/users"))
            .await;
    }

    Ok(ApiResponse::created(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_registration_is_forbidden() {
        let err = ensure_registration_open(false).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert!(ensure_registration_open(true).is_ok());
    }
}
