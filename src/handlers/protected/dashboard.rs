use axum::{extract::State, Extension};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UserDashboard;
use crate::state::AppState;

/// GET /api/dashboard - task, notification and membership counts for the caller
pub async fn dashboard_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<UserDashboard> {
    let dashboard = state.dashboard().user_dashboard(auth.id, auth.is_staff()).await?;
    Ok(ApiResponse::success(dashboard))
}
