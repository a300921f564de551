//! Notification dispatcher: targeted pushes on behalf of REST flows.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error};

use mathquest_core::error::AppError;
use mathquest_core::result::AppResult;
use mathquest_core::types::UserId;
use mathquest_database::DirectoryStore;
use mathquest_entity::{ChatMessage, Identity};

use crate::chat::handler::ChatHandler;
use crate::connection::manager::ConnectionManager;
use crate::message::types::OutboundMessage;
use crate::room::registry::personal_room;

use super::events::{LessonReviewed, LessonSubmitted, ReviewRequested};

/// Delivers server-initiated events to users.
#[derive(Debug)]
pub struct NotificationDispatcher {
    connections: Arc<ConnectionManager>,
    chat: Arc<ChatHandler>,
    directory: Arc<dyn DirectoryStore>,
}

impl NotificationDispatcher {
    /// Create a new dispatcher.
    pub fn new(
        connections: Arc<ConnectionManager>,
        chat: Arc<ChatHandler>,
        directory: Arc<dyn DirectoryStore>,
    ) -> Self {
        Self {
            connections,
            chat,
            directory,
        }
    }

    /// Deliver an event to the user's presence-routed connection.
    ///
    /// Offline users miss the event; there is no queue.
    pub fn emit_to_user(&self, user_id: UserId, message: OutboundMessage) -> bool {
        let delivered = self.connections.send_to_user(user_id, &message);
        if !delivered {
            debug!(user_id = %user_id, "User offline, event dropped");
        }
        delivered
    }

    /// Push a progress update to every connection of the user.
    pub fn emit_progress(&self, user_id: UserId, payload: Value) -> usize {
        self.connections
            .send_to_room(&personal_room(user_id), &OutboundMessage::Progress(payload))
    }

    /// Tell a teacher that a student submitted a lesson.
    pub fn lesson_submitted(&self, teacher_id: UserId, event: LessonSubmitted) -> bool {
        self.emit_to_user(teacher_id, OutboundMessage::StudentSubmittedLesson(event))
    }

    /// Tell a student that their lesson was reviewed.
    pub fn lesson_reviewed(&self, student_id: UserId, event: LessonReviewed) -> bool {
        self.emit_to_user(student_id, OutboundMessage::TeacherReviewedLesson(event))
    }

    /// Tell a teacher that a student asked for a review.
    pub fn review_requested(&self, teacher_id: UserId, event: ReviewRequested) -> bool {
        self.emit_to_user(teacher_id, OutboundMessage::StudentRequestedReview(event))
    }

    /// Persist a chat message on a user's behalf and push it to both parties.
    ///
    /// Used when a workflow step (submission, review) should also leave a
    /// trace in the conversation. Failures are logged and returned.
    pub async fn send_system_message(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        content: &str,
    ) -> AppResult<ChatMessage> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::validation("content must not be empty"));
        }

        let result = self.persist_system_message(sender_id, recipient_id, content).await;
        let chat = match result {
            Ok(chat) => chat,
            Err(e) => {
                error!(
                    sender_id = %sender_id,
                    recipient_id = %recipient_id,
                    error = %e,
                    "Failed to send system message"
                );
                return Err(e);
            }
        };

        let message = OutboundMessage::Message(chat.clone());
        self.emit_to_user(sender_id, message.clone());
        self.emit_to_user(recipient_id, message);
        Ok(chat)
    }

    async fn persist_system_message(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        content: &str,
    ) -> AppResult<ChatMessage> {
        let sender = self
            .directory
            .find_user(sender_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Sender {sender_id} not found")))?;

        self.chat
            .persist(
                Identity::new(sender_id, sender.role),
                recipient_id,
                content.to_string(),
            )
            .await
    }
}
