use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::models::Goal;
use crate::database::DatabaseError;
use crate::filter::ListClause;
use crate::services::cascade::{self, CascadeSummary};
use crate::types::GoalStatus;

pub const GOAL_ORDER_COLUMNS: &[&str] = &["title", "status", "deadline", "created_at", "updated_at"];

#[derive(Debug, Clone, Default)]
pub struct GoalChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<GoalStatus>,
    pub deadline: Option<NaiveDate>,
}

pub struct GoalService {
    pool: PgPool,
}

impl GoalService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_project(
        &self,
        project_id: Uuid,
        status: Option<GoalStatus>,
        clause: &ListClause,
    ) -> Result<Vec<Goal>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT g.* FROM goals g WHERE g.project_id = ");
        qb.push_bind(project_id);
        if let Some(status) = status {
            qb.push(" AND g.status = ").push_bind(status.as_str());
        }
        clause.push_to(&mut qb, "g");

        let goals = qb.build_query_as::<Goal>().fetch_all(&self.pool).await?;
        Ok(goals)
    }

    pub async fn get(&self, id: Uuid) -> Result<Goal, DatabaseError> {
        sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Goal not found".to_string()))
    }

    pub async fn create(
        &self,
        project_id: Uuid,
        title: &str,
        description: Option<&str>,
        status: GoalStatus,
        deadline: Option<NaiveDate>,
    ) -> Result<Goal, DatabaseError> {
        let goal = sqlx::query_as::<_, Goal>(
            "INSERT INTO goals (id, project_id, title, description, status, deadline)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(title)
        .bind(description)
        .bind(status.as_str())
        .bind(deadline)
        .fetch_one(&self.pool)
        .await?;
        Ok(goal)
    }

    pub async fn update(&self, id: Uuid, changes: &GoalChanges) -> Result<Goal, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE goals SET updated_at = now()");
        if let Some(title) = &changes.title {
            qb.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &changes.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(status) = changes.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(deadline) = changes.deadline {
            qb.push(", deadline = ").push_bind(deadline);
        }
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Goal>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Goal not found".to_string()))
    }

    /// Delete the goal with its tasks and their comments
    pub async fn delete_cascade(&self, id: Uuid) -> Result<CascadeSummary, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let summary = cascade::delete_goals(&mut tx, &[id]).await?;
        if summary.goals == 0 {
            return Err(DatabaseError::NotFound("Goal not found".to_string()));
        }

        tx.commit().await?;
        Ok(summary)
    }
}
