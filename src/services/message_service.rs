use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::models::ProjectMessage;
use crate::database::DatabaseError;
use crate::filter::ListClause;

pub const MESSAGE_ORDER_COLUMNS: &[&str] = &["created_at"];

/// Project chat
pub struct MessageService {
    pool: PgPool,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, project_id: Uuid, clause: &ListClause) -> Result<Vec<ProjectMessage>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT m.id, m.project_id, m.author_id, u.name AS author_name, m.body, m.created_at
             FROM project_messages m
             JOIN users u ON u.id = m.author_id
             WHERE m.project_id = ",
        );
        qb.push_bind(project_id);
        clause.push_to(&mut qb, "m");

        let messages = qb.build_query_as::<ProjectMessage>().fetch_all(&self.pool).await?;
        Ok(messages)
    }

    pub async fn post(&self, project_id: Uuid, author_id: Uuid, body: &str) -> Result<ProjectMessage, DatabaseError> {
        let message = sqlx::query_as::<_, ProjectMessage>(
            "WITH inserted AS (
                 INSERT INTO project_messages (id, project_id, author_id, body)
                 VALUES ($1, $2, $3, $4)
                 RETURNING *
             )
             SELECT i.id, i.project_id, i.author_id, u.name AS author_name, i.body, i.created_at
             FROM inserted i
             JOIN users u ON u.id = i.author_id",
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }
}
