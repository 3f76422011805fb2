//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::services::{
    DashboardService, GoalService, MessageService, NotificationService, ProjectService, TaskService,
    TeamService, UserService,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { pool }),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.pool().clone())
    }

    pub fn teams(&self) -> TeamService {
        TeamService::new(self.pool().clone())
    }

    pub fn projects(&self) -> ProjectService {
        ProjectService::new(self.pool().clone())
    }

    pub fn goals(&self) -> GoalService {
        GoalService::new(self.pool().clone())
    }

    pub fn tasks(&self) -> TaskService {
        TaskService::new(self.pool().clone())
    }

    pub fn messages(&self) -> MessageService {
        MessageService::new(self.pool().clone())
    }

    pub fn notifications(&self) -> NotificationService {
        NotificationService::new(self.pool().clone())
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.pool().clone())
    }
}
