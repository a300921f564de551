//! PostgreSQL-backed directory store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mathquest_core::result::AppResult;
use mathquest_core::types::UserId;
use mathquest_entity::{Message, NewMessage, User};

use crate::connection::DatabasePool;
use crate::repositories::{MessageRepository, UserRepository};
use crate::store::DirectoryStore;

/// [`DirectoryStore`] over the tables shared with the REST API.
#[derive(Debug, Clone)]
pub struct PgDirectoryStore {
    db: DatabasePool,
    users: UserRepository,
    messages: MessageRepository,
}

impl PgDirectoryStore {
    /// Build the store and its repositories on an open pool.
    pub fn new(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            users: UserRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
            db,
        }
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        self.users.find_by_id(id.into_uuid()).await
    }

    async fn students_of(&self, teacher_id: UserId) -> AppResult<Vec<User>> {
        self.users.find_students_of(teacher_id.into_uuid()).await
    }

    async fn teachers_of(&self, student_id: UserId) -> AppResult<Vec<User>> {
        self.users.find_teachers_of(student_id.into_uuid()).await
    }

    async fn messages_between(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>> {
        self.messages.find_between(a.into_uuid(), b.into_uuid()).await
    }

    async fn create_message(&self, new: NewMessage) -> AppResult<Message> {
        self.messages
            .create(new.sender_id.into_uuid(), new.recipient_id.into_uuid(), &new.content)
            .await
    }

    async fn mark_read(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        up_to: DateTime<Utc>,
    ) -> AppResult<u64> {
        self.messages
            .mark_read(sender_id.into_uuid(), recipient_id.into_uuid(), up_to)
            .await
    }

    async fn unread_counts(&self, recipient_id: UserId) -> AppResult<HashMap<UserId, u64>> {
        let rows = self
            .messages
            .count_unread_by_sender(recipient_id.into_uuid())
            .await?;
        Ok(rows
            .into_iter()
            .map(|(sender, count)| (UserId::from_uuid(sender), count.max(0) as u64))
            .collect())
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.health_check().await
    }
}
