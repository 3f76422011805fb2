use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::DatabaseError;
use crate::services::project_service::{push_project_filter, ProjectFilter};
use crate::types::{ProjectStatus, Role, TaskStatus};

#[derive(Debug, Serialize)]
pub struct UserCounts {
    pub total: i64,
    pub pending: i64,
    pub by_role: BTreeMap<String, i64>,
}

/// Site-wide figures for the admin dashboard
#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub users: UserCounts,
    pub teams: i64,
    pub projects: i64,
    pub projects_by_status: BTreeMap<String, i64>,
    pub tasks: i64,
    pub tasks_by_status: BTreeMap<String, i64>,
}

/// Personal figures for the signed-in user
#[derive(Debug, Serialize)]
pub struct UserDashboard {
    pub assigned_tasks: BTreeMap<String, i64>,
    pub overdue_tasks: i64,
    pub unread_notifications: i64,
    pub teams: i64,
    pub projects: i64,
}

pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn admin_stats(&self) -> Result<AdminStats, DatabaseError> {
        let (total, pending): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COUNT(*) FILTER (WHERE NOT is_approved) FROM users")
                .fetch_one(&self.pool)
                .await?;

        let by_role = self
            .grouped("SELECT role, COUNT(*) FROM users GROUP BY role", Role::ALL.iter().map(Role::as_str))
            .await?;

        let (teams,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM teams").fetch_one(&self.pool).await?;

        let projects_by_status = self
            .grouped(
                "SELECT status, COUNT(*) FROM projects GROUP BY status",
                ProjectStatus::ALL.iter().map(ProjectStatus::as_str),
            )
            .await?;

        let tasks_by_status = self
            .grouped(
                "SELECT status, COUNT(*) FROM tasks GROUP BY status",
                TaskStatus::ALL.iter().map(TaskStatus::as_str),
            )
            .await?;

        Ok(AdminStats {
            users: UserCounts { total, pending, by_role },
            teams,
            projects: projects_by_status.values().sum(),
            projects_by_status,
            tasks: tasks_by_status.values().sum(),
            tasks_by_status,
        })
    }

    /// `staff` callers count every project, like the project listing does
    pub async fn user_dashboard(&self, user_id: Uuid, staff: bool) -> Result<UserDashboard, DatabaseError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM tasks WHERE assignee_id = $1 GROUP BY status")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        let assigned_tasks = fill_counts(TaskStatus::ALL.iter().map(TaskStatus::as_str), rows);

        let (overdue_tasks,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks
             WHERE assignee_id = $1 AND status <> $2 AND due_date < CURRENT_DATE",
        )
        .bind(user_id)
        .bind(TaskStatus::Done.as_str())
        .fetch_one(&self.pool)
        .await?;

        let (unread_notifications,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let (teams,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM team_members WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let filter = ProjectFilter {
            visible_to: (!staff).then_some(user_id),
            ..Default::default()
        };
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM projects p WHERE TRUE");
        push_project_filter(&mut qb, &filter);
        let (projects,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;

        Ok(UserDashboard {
            assigned_tasks,
            overdue_tasks,
            unread_notifications,
            teams,
            projects,
        })
    }

    async fn grouped(
        &self,
        sql: &str,
        keys: impl Iterator<Item = &'static str>,
    ) -> Result<BTreeMap<String, i64>, DatabaseError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        Ok(fill_counts(keys, rows))
    }
}

/// Every known key appears in the result, zero when absent from `rows`
fn fill_counts(keys: impl Iterator<Item = &'static str>, rows: Vec<(String, i64)>) -> BTreeMap<String, i64> {
    let mut counts: BTreeMap<String, i64> = keys.map(|k| (k.to_string(), 0)).collect();
    for (key, count) in rows {
        counts.insert(key, count);
    }
    counts
}
