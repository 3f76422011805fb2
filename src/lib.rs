pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod types;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{authenticate_user, require_admin};
use crate::state::AppState;

/// Full application router with global middleware
pub fn app(state: AppState) -> Router {
    let config = config::config();

    let router = Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes())
        // Elevated
        .merge(admin_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer())
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        );

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    if crate::is_development!() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register_post))
        .route("/api/auth/login", post(auth::login_post))
        .route("/api/auth/logout", post(auth::logout_post))
}

fn protected_routes() -> Router<AppState> {
    use handlers::protected::{auth, dashboard, goals, notifications, projects, tasks, teams};

    Router::new()
        .route("/api/auth/me", get(auth::me_get))
        .route("/api/dashboard", get(dashboard::dashboard_get))
        // Teams and membership
        .route("/api/teams", get(teams::teams_get).post(teams::teams_post))
        .route(
            "/api/teams/:id",
            get(teams::team_get).patch(teams::team_patch).delete(teams::team_delete),
        )
        .route(
            "/api/teams/:id/members",
            get(teams::members_get)
                .post(teams::member_post)
                .patch(teams::member_patch)
                .delete(teams::member_delete),
        )
        // Projects, their goals and chat
        .route("/api/projects", get(projects::projects_get).post(projects::projects_post))
        .route(
            "/api/projects/:id",
            get(projects::project_get)
                .patch(projects::project_patch)
                .delete(projects::project_delete),
        )
        .route(
            "/api/projects/:id/goals",
            get(projects::project_goals_get).post(projects::project_goals_post),
        )
        .route(
            "/api/projects/:id/messages",
            get(projects::messages_get).post(projects::messages_post),
        )
        // Goals and their tasks
        .route(
            "/api/goals/:id",
            get(goals::goal_get).patch(goals::goal_patch).delete(goals::goal_delete),
        )
        .route("/api/goals/:id/tasks", get(goals::goal_tasks_get).post(goals::goal_tasks_post))
        // Tasks and comments
        .route("/api/tasks", get(tasks::tasks_get))
        .route(
            "/api/tasks/:id",
            get(tasks::task_get).patch(tasks::task_patch).delete(tasks::task_delete),
        )
        .route("/api/tasks/:id/comments", get(tasks::comments_get).post(tasks::comments_post))
        // Notifications
        .route("/api/notifications", get(notifications::notifications_get))
        .route("/api/notifications/read-all", post(notifications::notifications_read_all_post))
        .route("/api/notifications/:id/read", patch(notifications::notification_read_patch))
        .route(
            "/api/notifications/:id",
            axum::routing::delete(notifications::notification_delete),
        )
        .route_layer(from_fn(authenticate_user))
}

fn admin_routes() -> Router<AppState> {
    use handlers::elevated::admin;

    Router::new()
        .route("/api/admin/users", get(admin::users_get))
        .route("/api/admin/users/:id", patch(admin::user_patch).delete(admin::user_delete))
        .route("/api/admin/stats", get(admin::stats_get))
        // Layers run outermost-last: authenticate first, then the role check
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn(authenticate_user))
}
