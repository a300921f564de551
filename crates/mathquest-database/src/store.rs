//! The directory store seam used by the realtime gateway.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mathquest_core::result::AppResult;
use mathquest_core::types::UserId;
use mathquest_entity::{Message, NewMessage, User};

/// Roster lookups and direct-message persistence.
///
/// Implementations own their own consistency; the gateway never holds a
/// lock across any of these calls.
#[async_trait]
pub trait DirectoryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Look up a single user.
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>>;

    /// Students assigned to a teacher.
    async fn students_of(&self, teacher_id: UserId) -> AppResult<Vec<User>>;

    /// Teachers a student is assigned to.
    async fn teachers_of(&self, student_id: UserId) -> AppResult<Vec<User>>;

    /// Every message between `a` and `b` in either direction, oldest first.
    async fn messages_between(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>>;

    /// Persist a new unread message.
    async fn create_message(&self, new: NewMessage) -> AppResult<Message>;

    /// Mark unread messages from `sender_id` to `recipient_id` created at or
    /// before `up_to` as read. Returns the number of messages that changed.
    async fn mark_read(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        up_to: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Unread message counts addressed to `recipient_id`, keyed by sender.
    async fn unread_counts(&self, recipient_id: UserId) -> AppResult<HashMap<UserId, u64>>;

    /// Whether the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
