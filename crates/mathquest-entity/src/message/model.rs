//! Chat message row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mathquest_core::types::{MessageId, UserId};

/// A direct message between two users, as stored in the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    /// Primary key.
    #[sqlx(try_from = "Uuid")]
    pub id: MessageId,
    /// Author.
    #[sqlx(try_from = "Uuid")]
    pub sender_id: UserId,
    /// Addressee.
    #[sqlx(try_from = "Uuid")]
    pub recipient_id: UserId,
    /// Message text, never empty.
    pub content: String,
    /// Persistence time; the sort key for history.
    pub created_at: DateTime<Utc>,
    /// Whether the recipient has opened the conversation since.
    pub read: bool,
    /// When `read` flipped to true.
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Whether this message travels between `a` and `b`, in either direction.
    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        (self.sender_id == a && self.recipient_id == b)
            || (self.sender_id == b && self.recipient_id == a)
    }
}

/// Input for creating a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Author.
    pub sender_id: UserId,
    /// Addressee.
    pub recipient_id: UserId,
    /// Message text.
    pub content: String,
}
