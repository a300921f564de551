//! Wire format for chat messages sent to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mathquest_core::types::{MessageId, UserId};

use super::model::Message;
use crate::user::UserRole;

/// A message as delivered in `message` and `messages` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message ID.
    pub id: MessageId,
    /// Author.
    pub sender_id: UserId,
    /// Addressee.
    pub recipient_id: UserId,
    /// Author's full name (may be empty).
    pub sender_name: String,
    /// Author's lowercase role.
    pub sender_role: String,
    /// Message text.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Read flag at the time the message was fetched.
    pub read: bool,
    /// Read time, if read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Formats a stored message with its author's name and role.
    pub fn format(message: &Message, sender_name: &str, sender_role: UserRole) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            sender_name: sender_name.to_string(),
            sender_role: sender_role.as_str().to_string(),
            content: message.content.clone(),
            timestamp: message.created_at,
            read: message.read,
            read_at: message.read_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let message = Message {
            id: MessageId::new(),
            sender_id: UserId::new(),
            recipient_id: UserId::new(),
            content: "hello".to_string(),
            created_at: Utc::now(),
            read: false,
            read_at: None,
        };

        let chat = ChatMessage::format(&message, "Ada Lovelace", UserRole::Teacher);
        let json = serde_json::to_value(&chat).unwrap();

        assert_eq!(json["senderId"], message.sender_id.to_string());
        assert_eq!(json["recipientId"], message.recipient_id.to_string());
        assert_eq!(json["senderName"], "Ada Lovelace");
        assert_eq!(json["senderRole"], "teacher");
        assert_eq!(json["content"], "hello");
        assert_eq!(json["read"], false);
        assert!(json.get("readAt").is_none());
    }
}
