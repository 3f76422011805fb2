use axum::{extract::State, Extension};

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/auth/me - the signed-in user
pub async fn me_get(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<User> {
    let user = state.users().get(auth.id).await?;
    Ok(ApiResponse::success(user))
}
