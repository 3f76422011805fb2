use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "ProjectHub API",
            "version": version,
            "description": "Team, project and task management backend",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/auth/register, /api/auth/login, /api/auth/logout (public); /api/auth/me (protected)",
                "dashboard": "/api/dashboard (protected)",
                "teams": "/api/teams[/:id[/members]] (protected)",
                "projects": "/api/projects[/:id[/goals|/messages]] (protected)",
                "goals": "/api/goals/:id[/tasks] (protected)",
                "tasks": "/api/tasks[/:id[/comments]] (protected)",
                "notifications": "/api/notifications[/:id[/read]|/read-all] (protected)",
                "admin": "/api/admin/users[/:id], /api/admin/stats (admin only)",
            }
        }
    }))
}

/// GET /health - database connectivity check
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(state.pool()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}
