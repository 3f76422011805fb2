use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::models::User;
use crate::database::{is_foreign_key_violation, is_unique_violation, DatabaseError};
use crate::filter::ListClause;
use crate::types::Role;

pub const USER_ORDER_COLUMNS: &[&str] = &["name", "email", "role", "created_at", "updated_at"];

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub is_approved: Option<bool>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_approved: Option<bool>,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a user. The very first account becomes an approved admin;
    /// everyone after that starts as an unapproved member.
    pub async fn register(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent registrations so only one can see an empty table
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;

        let (role, is_approved) = registration_role(existing);

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, role, is_approved)
             VALUES ($1, $2, lower($3), $4, $5, $6)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(role.as_str())
        .bind(is_approved)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| email_conflict(e, &new_user.email))?;

        tx.commit().await?;

        if existing == 0 {
            tracing::info!("First user {} registered as administrator", user.email);
        }
        Ok(user)
    }

    /// Create an approved user with an explicit role (CLI bootstrap)
    pub async fn create_approved(&self, new_user: NewUser, role: Role) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, role, is_approved)
             VALUES ($1, $2, lower($3), $4, $5, TRUE)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| email_conflict(e, &new_user.email))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, DatabaseError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list(&self, filter: &UserFilter, clause: &ListClause) -> Result<Vec<User>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT u.* FROM users u WHERE TRUE");
        if let Some(approved) = filter.is_approved {
            qb.push(" AND u.is_approved = ").push_bind(approved);
        }
        if let Some(role) = filter.role {
            qb.push(" AND u.role = ").push_bind(role.as_str());
        }
        clause.push_to(&mut qb, "u");

        let users = qb.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }

    pub async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<User, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET updated_at = now()");
        if let Some(name) = &changes.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(role) = changes.role {
            qb.push(", role = ").push_bind(role.as_str());
        }
        if let Some(approved) = changes.is_approved {
            qb.push(", is_approved = ").push_bind(approved);
        }
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    /// Delete a user together with their memberships and notifications.
    /// Users who still own teams, projects or chat history are kept (409).
    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM team_members WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE tasks SET assignee_id = NULL, updated_at = now() WHERE assignee_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    DatabaseError::Conflict(
                        "User still owns teams, projects, comments or messages".to_string(),
                    )
                } else {
                    e.into()
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("User not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn admin_ids(&self) -> Result<Vec<Uuid>, DatabaseError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE role = 'admin' AND is_approved")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}

fn email_conflict(err: sqlx::Error, email: &str) -> DatabaseError {
    if is_unique_violation(&err) {
        DatabaseError::Conflict(format!("Email '{}' is already registered", email.trim().to_lowercase()))
    } else {
        err.into()
    }
}

/// Role and approval for a new registration given how many users exist
fn registration_role(existing_users: i64) -> (Role, bool) {
    if existing_users == 0 {
        (Role::Admin, true)
    } else {
        (Role::Member, false)
    }
}
