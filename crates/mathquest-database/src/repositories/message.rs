//! Direct message repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mathquest_core::error::{AppError, ErrorKind};
use mathquest_core::result::AppResult;
use mathquest_entity::Message;

/// Repository for the `messages` table.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The full conversation between two users, oldest first.
    pub async fn find_between(&self, a: Uuid, b: Uuid) -> AppResult<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            "SELECT id, sender_id, recipient_id, content, created_at, read, read_at \
             FROM messages \
             WHERE (sender_id = $1 AND recipient_id = $2) \
                OR (sender_id = $2 AND recipient_id = $1) \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load conversation", e))
    }

    /// Insert an unread message.
    pub async fn create(&self, sender_id: Uuid, recipient_id: Uuid, content: &str) -> AppResult<Message> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (id, sender_id, recipient_id, content, created_at, read) \
             VALUES ($1, $2, $3, $4, $5, FALSE) \
             RETURNING id, sender_id, recipient_id, content, created_at, read, read_at",
        )
        .bind(Uuid::new_v4())
        .bind(sender_id)
        .bind(recipient_id)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create message", e))
    }

    /// Flip every unread message from `sender_id` to `recipient_id` to read.
    pub async fn mark_read(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        up_to: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET read = TRUE, read_at = $3 \
             WHERE sender_id = $1 AND recipient_id = $2 AND read = FALSE \
             AND created_at <= $4",
        )
        .bind(sender_id)
        .bind(recipient_id)
        .bind(Utc::now())
        .bind(up_to)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark messages read", e))?;
        Ok(result.rows_affected())
    }

    /// Unread counts addressed to a user, grouped by sender.
    pub async fn count_unread_by_sender(&self, recipient_id: Uuid) -> AppResult<Vec<(Uuid, i64)>> {
        sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT sender_id, COUNT(*) FROM messages \
             WHERE recipient_id = $1 AND read = FALSE \
             GROUP BY sender_id",
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread messages", e))
    }
}
