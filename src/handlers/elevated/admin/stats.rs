use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AdminStats;
use crate::state::AppState;

/// GET /api/admin/stats - user, team, project and task counts
pub async fn stats_get(State(state): State<AppState>) -> ApiResult<AdminStats> {
    let stats = state.dashboard().admin_stats().await?;
    Ok(ApiResponse::success(stats))
}
