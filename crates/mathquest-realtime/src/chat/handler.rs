//! Chat request handlers backed by the directory store.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use mathquest_core::error::AppError;
use mathquest_core::result::AppResult;
use mathquest_core::types::UserId;
use mathquest_database::DirectoryStore;
use mathquest_entity::{ChatMessage, DirectoryUser, Identity, Message, NewMessage, User, UserRole};

use crate::connection::manager::ConnectionManager;
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

/// Serves chat requests on behalf of an authenticated identity.
#[derive(Debug)]
pub struct ChatHandler {
    directory: Arc<dyn DirectoryStore>,
    connections: Arc<ConnectionManager>,
    metrics: Arc<RealtimeMetrics>,
}

impl ChatHandler {
    /// Creates a new chat handler.
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        connections: Arc<ConnectionManager>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            directory,
            connections,
            metrics,
        }
    }

    /// The caller's counterparts with live presence attached.
    ///
    /// Teachers get their students, students get their teachers.
    pub async fn get_users(&self, caller: Identity) -> AppResult<Vec<DirectoryUser>> {
        let counterparts = match caller.role {
            UserRole::Teacher => self.directory.students_of(caller.user_id).await?,
            UserRole::Student => self.directory.teachers_of(caller.user_id).await?,
        };

        Ok(counterparts
            .iter()
            .map(|user| DirectoryUser::from_user(user, self.connections.is_online(user.id)))
            .collect())
    }

    /// The full conversation with `counterpart_id`, oldest first.
    ///
    /// Messages the counterpart sent to the caller are marked read after the
    /// fetch, up to the newest one fetched; the returned list shows them as
    /// they were before. A message persisted after the fetch stays unread.
    pub async fn get_messages(
        &self,
        caller: Identity,
        counterpart_id: UserId,
    ) -> AppResult<Vec<ChatMessage>> {
        let history = self
            .directory
            .messages_between(caller.user_id, counterpart_id)
            .await?;

        let newest_received = history
            .iter()
            .filter(|m| m.sender_id == counterpart_id && !m.read)
            .map(|m| m.created_at)
            .max();
        let marked = match newest_received {
            Some(up_to) => {
                self.directory
                    .mark_read(counterpart_id, caller.user_id, up_to)
                    .await?
            }
            None => 0,
        };
        if marked > 0 {
            debug!(
                user_id = %caller.user_id,
                counterpart_id = %counterpart_id,
                marked,
                "Marked conversation read"
            );
        }

        let caller_user = self.lookup(caller.user_id).await;
        let counterpart_user = self.lookup(counterpart_id).await;

        Ok(history
            .iter()
            .map(|message| {
                let (user, fallback_role) = if message.sender_id == caller.user_id {
                    (caller_user.as_ref(), caller.role)
                } else {
                    (counterpart_user.as_ref(), caller.role.counterpart())
                };
                format_message(message, user, fallback_role)
            })
            .collect())
    }

    /// Persist a message from `sender` and deliver it to the recipient's
    /// routed connection if they are online.
    ///
    /// Nothing is delivered unless persistence succeeded. The caller echoes
    /// the returned message to the sending connection. Messages addressed to
    /// the sender are rejected.
    pub async fn send_message(
        &self,
        sender: Identity,
        recipient_id: UserId,
        content: String,
    ) -> AppResult<ChatMessage> {
        if recipient_id == sender.user_id {
            return Err(AppError::validation("recipientId must not be the sender"));
        }

        let chat = self.persist(sender, recipient_id, content).await?;

        let delivered = self
            .connections
            .send_to_user(recipient_id, &OutboundMessage::Message(chat.clone()));
        debug!(
            message_id = %chat.id,
            sender_id = %sender.user_id,
            recipient_id = %recipient_id,
            delivered,
            "Chat message fanned out"
        );

        Ok(chat)
    }

    /// Unread counts addressed to the caller, keyed by sender.
    pub async fn unread_summary(&self, caller: Identity) -> AppResult<HashMap<UserId, u64>> {
        self.directory.unread_counts(caller.user_id).await
    }

    /// Persist a message and format it for the wire.
    pub(crate) async fn persist(
        &self,
        sender: Identity,
        recipient_id: UserId,
        content: String,
    ) -> AppResult<ChatMessage> {
        let message = self
            .directory
            .create_message(NewMessage {
                sender_id: sender.user_id,
                recipient_id,
                content,
            })
            .await?;
        self.metrics.message_persisted();

        let sender_user = self.lookup(sender.user_id).await;
        Ok(format_message(&message, sender_user.as_ref(), sender.role))
    }

    /// Look up a user for display purposes. Failures degrade to `None`.
    async fn lookup(&self, user_id: UserId) -> Option<User> {
        match self.directory.find_user(user_id).await {
            Ok(user) => user,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "User lookup failed");
                None
            }
        }
    }
}

fn format_message(message: &Message, sender: Option<&User>, fallback_role: UserRole) -> ChatMessage {
    match sender {
        Some(user) => ChatMessage::format(message, &user.full_name(), user.role),
        None => ChatMessage::format(message, "", fallback_role),
    }
}
