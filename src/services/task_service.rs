use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::models::{Task, TaskComment};
use crate::database::DatabaseError;
use crate::filter::ListClause;
use crate::services::cascade::{self, CascadeSummary};
use crate::types::{TaskPriority, TaskStatus};

pub const TASK_ORDER_COLUMNS: &[&str] = &["title", "priority", "status", "due_date", "created_at", "updated_at"];
pub const COMMENT_ORDER_COLUMNS: &[&str] = &["created_at"];

#[derive(Debug, Clone)]
pub struct NewTask {
    pub goal_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub goal_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Restrict to tasks assigned to this user or in projects visible to them
    pub visible_to: Option<Uuid>,
}

pub struct TaskService {
    pool: PgPool,
}

impl TaskService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &TaskFilter, clause: &ListClause) -> Result<Vec<Task>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT t.* FROM tasks t
             JOIN goals g ON g.id = t.goal_id
             JOIN projects p ON p.id = g.project_id
             WHERE TRUE",
        );
        if let Some(goal_id) = filter.goal_id {
            qb.push(" AND t.goal_id = ").push_bind(goal_id);
        }
        if let Some(assignee_id) = filter.assignee_id {
            qb.push(" AND t.assignee_id = ").push_bind(assignee_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND t.status = ").push_bind(status.as_str());
        }
        if let Some(priority) = filter.priority {
            qb.push(" AND t.priority = ").push_bind(priority.as_str());
        }
        if let Some(user_id) = filter.visible_to {
            qb.push(" AND (t.assignee_id = ")
                .push_bind(user_id)
                .push(" OR p.owner_id = ")
                .push_bind(user_id)
                .push(" OR p.team_id IN (SELECT team_id FROM team_members WHERE user_id = ")
                .push_bind(user_id)
                .push("))");
        }
        clause.clone().sort_by("priority", "priority_rank").push_to(&mut qb, "t");

        let tasks = qb.build_query_as::<Task>().fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    pub async fn get(&self, id: Uuid) -> Result<Task, DatabaseError> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Task not found".to_string()))
    }

    /// Id of the project a task belongs to (through its goal)
    pub async fn project_id(&self, task: &Task) -> Result<Uuid, DatabaseError> {
        sqlx::query_scalar::<_, Uuid>("SELECT project_id FROM goals WHERE id = $1")
            .bind(task.goal_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Goal not found".to_string()))
    }

    pub async fn create(&self, new_task: &NewTask) -> Result<Task, DatabaseError> {
        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (id, goal_id, title, description, assignee_id, priority, status, due_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new_task.goal_id)
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.assignee_id)
        .bind(new_task.priority.as_str())
        .bind(new_task.status.as_str())
        .bind(new_task.due_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    pub async fn update(&self, id: Uuid, changes: &TaskChanges) -> Result<Task, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE tasks SET updated_at = now()");
        if let Some(title) = &changes.title {
            qb.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &changes.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(assignee_id) = changes.assignee_id {
            qb.push(", assignee_id = ").push_bind(assignee_id);
        }
        if let Some(priority) = changes.priority {
            qb.push(", priority = ").push_bind(priority.as_str());
        }
        if let Some(status) = changes.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(due_date) = changes.due_date {
            qb.push(", due_date = ").push_bind(due_date);
        }
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Task>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Task not found".to_string()))
    }

    /// Delete the task and its comments
    pub async fn delete_cascade(&self, id: Uuid) -> Result<CascadeSummary, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let summary = cascade::delete_tasks(&mut tx, &[id]).await?;
        if summary.tasks == 0 {
            return Err(DatabaseError::NotFound("Task not found".to_string()));
        }

        tx.commit().await?;
        Ok(summary)
    }

    pub async fn comments(&self, task_id: Uuid, clause: &ListClause) -> Result<Vec<TaskComment>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT c.id, c.task_id, c.author_id, u.name AS author_name, c.body, c.created_at
             FROM task_comments c
             JOIN users u ON u.id = c.author_id
             WHERE c.task_id = ",
        );
        qb.push_bind(task_id);
        clause.push_to(&mut qb, "c");

        let comments = qb.build_query_as::<TaskComment>().fetch_all(&self.pool).await?;
        Ok(comments)
    }

    pub async fn add_comment(&self, task_id: Uuid, author_id: Uuid, body: &str) -> Result<TaskComment, DatabaseError> {
        let comment = sqlx::query_as::<_, TaskComment>(
            "WITH inserted AS (
                 INSERT INTO task_comments (id, task_id, author_id, body)
                 VALUES ($1, $2, $3, $4)
                 RETURNING *
             )
             SELECT i.id, i.task_id, i.author_id, u.name AS author_name, i.body, i.created_at
             FROM inserted i
             JOIN users u ON u.id = i.author_id",
        )
        .bind(Uuid::new_v4())
        .bind(task_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }
}
