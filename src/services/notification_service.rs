use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::models::Notification;
use crate::database::DatabaseError;
use crate::filter::ListClause;
use crate::types::NotificationKind;

pub const NOTIFICATION_ORDER_COLUMNS: &[&str] = &["created_at", "kind"];

pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one notification per recipient
    pub async fn notify_many(
        &self,
        recipients: &[Uuid],
        kind: NotificationKind,
        message: &str,
        link: Option<&str>,
    ) -> Result<u64, DatabaseError> {
        if recipients.is_empty() {
            return Ok(0);
        }

        let ids: Vec<Uuid> = recipients.iter().map(|_| Uuid::new_v4()).collect();
        let result = sqlx::query(
            "INSERT INTO notifications (id, user_id, kind, message, link)
             SELECT id, user_id, $3, $4, $5
             FROM UNNEST($1::uuid[], $2::uuid[]) AS r(id, user_id)",
        )
        .bind(&ids)
        .bind(recipients)
        .bind(kind.as_str())
        .bind(message)
        .bind(link)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Fire-and-log variant: a failed notification never fails the request
    pub async fn notify_best_effort(&self, recipients: &[Uuid], kind: NotificationKind, message: &str, link: Option<&str>) {
        if let Err(e) = self.notify_many(recipients, kind, message, link).await {
            tracing::warn!("Failed to send {} notification to {} users: {}", kind, recipients.len(), e);
        }
    }

    pub async fn list(&self, user_id: Uuid, unread_only: bool, clause: &ListClause) -> Result<Vec<Notification>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT n.* FROM notifications n WHERE n.user_id = ");
        qb.push_bind(user_id);
        if unread_only {
            qb.push(" AND NOT n.is_read");
        }
        clause.push_to(&mut qb, "n");

        let notifications = qb.build_query_as::<Notification>().fetch_all(&self.pool).await?;
        Ok(notifications)
    }

    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, DatabaseError> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Notification not found".to_string()))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Notification not found".to_string()));
        }
        Ok(())
    }
}
