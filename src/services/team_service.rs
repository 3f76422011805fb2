use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::models::{Team, TeamMember};
use crate::database::{is_unique_violation, DatabaseError};
use crate::filter::ListClause;
use crate::services::cascade::{self, CascadeSummary};
use crate::types::TeamRole;

pub const TEAM_ORDER_COLUMNS: &[&str] = &["name", "created_at", "updated_at"];

const MEMBER_SELECT: &str = "SELECT m.team_id, m.user_id, m.role, m.joined_at, u.name, u.email
     FROM team_members m
     JOIN users u ON u.id = m.user_id";

pub struct TeamService {
    pool: PgPool,
}

impl TeamService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All teams, or only those `member_of` belongs to
    pub async fn list(&self, member_of: Option<Uuid>, clause: &ListClause) -> Result<Vec<Team>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT t.* FROM teams t WHERE TRUE");
        if let Some(user_id) = member_of {
            qb.push(" AND t.id IN (SELECT team_id FROM team_members WHERE user_id = ")
                .push_bind(user_id)
                .push(")");
        }
        clause.push_to(&mut qb, "t");

        let teams = qb.build_query_as::<Team>().fetch_all(&self.pool).await?;
        Ok(teams)
    }

    pub async fn get(&self, id: Uuid) -> Result<Team, DatabaseError> {
        sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Team not found".to_string()))
    }

    /// Create a team; the creator joins it as lead
    pub async fn create(&self, name: &str, description: Option<&str>, created_by: Uuid) -> Result<Team, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let team = sqlx::query_as::<_, Team>(
            "INSERT INTO teams (id, name, description, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| name_conflict(e, name))?;

        sqlx::query("INSERT INTO team_members (team_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(team.id)
            .bind(created_by)
            .bind(TeamRole::Lead.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(team)
    }

    pub async fn update(&self, id: Uuid, name: Option<&str>, description: Option<&str>) -> Result<Team, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE teams SET updated_at = now()");
        if let Some(name) = name {
            qb.push(", name = ").push_bind(name.to_string());
        }
        if let Some(description) = description {
            qb.push(", description = ").push_bind(description.to_string());
        }
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Team>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| name_conflict(e, name.unwrap_or_default()))?
            .ok_or_else(|| DatabaseError::NotFound("Team not found".to_string()))
    }

    /// Delete the team and everything under it in one transaction
    pub async fn delete_cascade(&self, id: Uuid) -> Result<CascadeSummary, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let summary = cascade::delete_team(&mut tx, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Team not found".to_string()))?;

        tx.commit().await?;

        tracing::info!(
            "Deleted team {} with {} projects, {} goals, {} tasks",
            id,
            summary.projects,
            summary.goals,
            summary.tasks
        );
        Ok(summary)
    }

    pub async fn members(&self, team_id: Uuid) -> Result<Vec<TeamMember>, DatabaseError> {
        let sql = format!("{} WHERE m.team_id = $1 ORDER BY m.joined_at", MEMBER_SELECT);
        let members = sqlx::query_as::<_, TeamMember>(&sql)
            .bind(team_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    pub async fn member(&self, team_id: Uuid, user_id: Uuid) -> Result<Option<TeamMember>, DatabaseError> {
        let sql = format!("{} WHERE m.team_id = $1 AND m.user_id = $2", MEMBER_SELECT);
        let member = sqlx::query_as::<_, TeamMember>(&sql)
            .bind(team_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    pub async fn member_role(&self, team_id: Uuid, user_id: Uuid) -> Result<Option<TeamRole>, DatabaseError> {
        let role = sqlx::query_scalar::<_, String>("SELECT role FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role.and_then(|r| r.parse().ok()))
    }

    pub async fn member_ids(&self, team_id: Uuid) -> Result<Vec<Uuid>, DatabaseError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM team_members WHERE team_id = $1")
            .bind(team_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    pub async fn add_member(&self, team_id: Uuid, user_id: Uuid, role: TeamRole) -> Result<TeamMember, DatabaseError> {
        sqlx::query("INSERT INTO team_members (team_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(team_id)
            .bind(user_id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DatabaseError::Conflict("User is already a member of this team".to_string())
                } else {
                    e.into()
                }
            })?;

        self.member(team_id, user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Team member not found".to_string()))
    }

    pub async fn update_member(&self, team_id: Uuid, user_id: Uuid, role: TeamRole) -> Result<TeamMember, DatabaseError> {
        let result = sqlx::query("UPDATE team_members SET role = $3 WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Team member not found".to_string()));
        }

        self.member(team_id, user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Team member not found".to_string()))
    }

    pub async fn remove_member(&self, team_id: Uuid, user_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Team member not found".to_string()));
        }
        Ok(())
    }
}

fn name_conflict(err: sqlx::Error, name: &str) -> DatabaseError {
    if is_unique_violation(&err) {
        DatabaseError::Conflict(format!("A team named '{}' already exists", name))
    } else {
        err.into()
    }
}
