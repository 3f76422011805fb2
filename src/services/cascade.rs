//! Explicit child-first deletes, always run inside a caller's transaction

use serde::Serialize;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// Rows removed by a cascading delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeSummary {
    pub members: u64,
    pub projects: u64,
    pub messages: u64,
    pub goals: u64,
    pub tasks: u64,
    pub comments: u64,
}

pub async fn delete_tasks(tx: &mut Transaction<'_, Postgres>, task_ids: &[Uuid]) -> Result<CascadeSummary, sqlx::Error> {
    let comments = sqlx::query("DELETE FROM task_comments WHERE task_id = ANY($1)")
        .bind(task_ids)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    let tasks = sqlx::query("DELETE FROM tasks WHERE id = ANY($1)")
        .bind(task_ids)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    Ok(CascadeSummary {
        tasks,
        comments,
        ..Default::default()
    })
}

pub async fn delete_goals(tx: &mut Transaction<'_, Postgres>, goal_ids: &[Uuid]) -> Result<CascadeSummary, sqlx::Error> {
    let task_ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM tasks WHERE goal_id = ANY($1)")
        .bind(goal_ids)
        .fetch_all(&mut **tx)
        .await?;

    let mut summary = delete_tasks(tx, &task_ids).await?;

    summary.goals = sqlx::query("DELETE FROM goals WHERE id = ANY($1)")
        .bind(goal_ids)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    Ok(summary)
}

pub async fn delete_projects(
    tx: &mut Transaction<'_, Postgres>,
    project_ids: &[Uuid],
) -> Result<CascadeSummary, sqlx::Error> {
    let goal_ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM goals WHERE project_id = ANY($1)")
        .bind(project_ids)
        .fetch_all(&mut **tx)
        .await?;

    let mut summary = delete_goals(tx, &goal_ids).await?;

    summary.messages = sqlx::query("DELETE FROM project_messages WHERE project_id = ANY($1)")
        .bind(project_ids)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    summary.projects = sqlx::query("DELETE FROM projects WHERE id = ANY($1)")
        .bind(project_ids)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    Ok(summary)
}

/// Team, its members, and every project assigned to it
pub async fn delete_team(tx: &mut Transaction<'_, Postgres>, team_id: Uuid) -> Result<Option<CascadeSummary>, sqlx::Error> {
    let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM teams WHERE id = $1 FOR UPDATE")
        .bind(team_id)
        .fetch_optional(&mut **tx)
        .await?;
    if locked.is_none() {
        return Ok(None);
    }

    let project_ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM projects WHERE team_id = $1")
        .bind(team_id)
        .fetch_all(&mut **tx)
        .await?;

    let mut summary = delete_projects(tx, &project_ids).await?;

    summary.members = sqlx::query("DELETE FROM team_members WHERE team_id = $1")
        .bind(team_id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM teams WHERE id = $1")
        .bind(team_id)
        .execute(&mut **tx)
        .await?;

    Ok(Some(summary))
}
