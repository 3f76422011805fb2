use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, verify_password, Claims};
use crate::config;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::auth::session_cookie;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;
use crate::validation::{Validate, Validator};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .check("email", !self.email.trim().is_empty(), "This field is required")
            .check("password", !self.password.is_empty(), "This field is required")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// POST /api/auth/login - exchange credentials for a JWT
///
/// The token is returned in the body and also set as an httpOnly cookie.
pub async fn login_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    payload.validate()?;

    let user = match state.users().find_by_email(&payload.email).await? {
        Some(user) if verify_password(&payload.password, &user.password_hash) => user,
        _ => {
            tracing::warn!("Failed login attempt for {}", payload.email.trim());
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
    };

    if !user.is_approved {
        return Err(ApiError::forbidden("Account is awaiting administrator approval"));
    }

    let token = generate_jwt(&Claims::for_user(&user))?;
    let expires_in = config::config().security.jwt_expiry_hours as i64 * 3600;

    tracing::info!("User {} logged in", user.email);

    Ok(ApiResponse::success(LoginResponse {
        token: token.clone(),
        user,
        expires_in,
    })
    .with_cookie(session_cookie(&token, expires_in)))
}
