use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::models::Project;
use crate::database::DatabaseError;
use crate::filter::ListClause;
use crate::services::cascade::{self, CascadeSummary};
use crate::types::ProjectStatus;

pub const PROJECT_ORDER_COLUMNS: &[&str] = &["name", "status", "start_date", "end_date", "created_at", "updated_at"];

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub owner_id: Uuid,
    pub team_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub team_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub team_id: Option<Uuid>,
    /// Restrict to projects this user owns or whose team they belong to
    pub visible_to: Option<Uuid>,
}

pub struct ProjectService {
    pool: PgPool,
}

impl ProjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ProjectFilter, clause: &ListClause) -> Result<Vec<Project>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT p.* FROM projects p WHERE TRUE");
        push_project_filter(&mut qb, filter);
        clause.push_to(&mut qb, "p");

        let projects = qb.build_query_as::<Project>().fetch_all(&self.pool).await?;
        Ok(projects)
    }

    pub async fn get(&self, id: Uuid) -> Result<Project, DatabaseError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Project not found".to_string()))
    }

    pub async fn create(&self, new_project: &NewProject) -> Result<Project, DatabaseError> {
        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (id, name, description, status, owner_id, team_id, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new_project.name)
        .bind(&new_project.description)
        .bind(new_project.status.as_str())
        .bind(new_project.owner_id)
        .bind(new_project.team_id)
        .bind(new_project.start_date)
        .bind(new_project.end_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(project)
    }

    pub async fn update(&self, id: Uuid, changes: &ProjectChanges) -> Result<Project, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE projects SET updated_at = now()");
        if let Some(name) = &changes.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(description) = &changes.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(status) = changes.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(team_id) = changes.team_id {
            qb.push(", team_id = ").push_bind(team_id);
        }
        if let Some(owner_id) = changes.owner_id {
            qb.push(", owner_id = ").push_bind(owner_id);
        }
        if let Some(start_date) = changes.start_date {
            qb.push(", start_date = ").push_bind(start_date);
        }
        if let Some(end_date) = changes.end_date {
            qb.push(", end_date = ").push_bind(end_date);
        }
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Project>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Project not found".to_string()))
    }

    /// Delete the project with its goals, tasks, comments and messages
    pub async fn delete_cascade(&self, id: Uuid) -> Result<CascadeSummary, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let summary = cascade::delete_projects(&mut tx, &[id]).await?;
        if summary.projects == 0 {
            return Err(DatabaseError::NotFound("Project not found".to_string()));
        }

        tx.commit().await?;
        Ok(summary)
    }
}

/// Shared WHERE fragment for project listings and dashboard counts
pub fn push_project_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProjectFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND p.status = ").push_bind(status.as_str());
    }
    if let Some(team_id) = filter.team_id {
        qb.push(" AND p.team_id = ").push_bind(team_id);
    }
    if let Some(user_id) = filter.visible_to {
        qb.push(" AND (p.owner_id = ")
            .push_bind(user_id)
            .push(" OR p.team_id IN (SELECT team_id FROM team_members WHERE user_id = ")
            .push_bind(user_id)
            .push("))");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_filter_binds_user_twice() {
        let filter = ProjectFilter {
            status: Some(ProjectStatus::Active),
            visible_to: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT p.* FROM projects p WHERE TRUE");
        push_project_filter(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT p.* FROM projects p WHERE TRUE AND p.status = $1 AND (p.owner_id = $2 \
             OR p.team_id IN (SELECT team_id FROM team_members WHERE user_id = $3))"
        );
    }
}
