//! Inbound and outbound event definitions.
//!
//! Every frame on the wire is `{"event": "<name>", "data": <payload>}`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mathquest_core::error::{AppError, ErrorKind};
use mathquest_core::types::UserId;
use mathquest_entity::{ChatMessage, DirectoryUser};

use crate::notification::events::{LessonReviewed, LessonSubmitted, ReviewRequested};

/// A decoded and validated client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// `getUsers`: the caller's counterparts.
    GetUsers,
    /// `getMessages {userId}`: the conversation with one counterpart.
    GetMessages {
        /// The other participant.
        counterpart_id: UserId,
    },
    /// `sendMessage {recipientId, content}`.
    SendMessage {
        /// Addressee.
        recipient_id: UserId,
        /// Trimmed, non-empty text.
        content: String,
    },
    /// `getUnreadSummary`: unread counts keyed by sender.
    GetUnreadSummary,
}

impl InboundMessage {
    /// Wire name of the event.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::GetUsers => "getUsers",
            Self::GetMessages { .. } => "getMessages",
            Self::SendMessage { .. } => "sendMessage",
            Self::GetUnreadSummary => "getUnreadSummary",
        }
    }
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Directory reply.
    Users(Vec<DirectoryUser>),
    /// History reply.
    Messages(Vec<ChatMessage>),
    /// A new chat message, to the recipient and as an echo to the sender.
    Message(ChatMessage),
    /// Presence change broadcast.
    UserStatusChange(StatusChange),
    /// Free-form progress push to a user's personal room.
    Progress(serde_json::Value),
    /// Unread counts keyed by sender.
    UnreadSummary(HashMap<UserId, u64>),
    /// A student submitted a lesson for review (to the teacher).
    StudentSubmittedLesson(LessonSubmitted),
    /// A teacher reviewed a lesson (to the student).
    TeacherReviewedLesson(LessonReviewed),
    /// A student asked for a review (to the teacher).
    StudentRequestedReview(ReviewRequested),
    /// Request failure for the requesting connection.
    Error(ErrorPayload),
}

impl OutboundMessage {
    /// Build an `error` event from an application error.
    pub fn error(err: &AppError) -> Self {
        Self::Error(ErrorPayload {
            code: ErrorCode::for_error(err),
            message: err.message.clone(),
        })
    }

    /// Build an `error` event with an explicit code.
    pub fn error_with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            code,
            message: message.into(),
        })
    }
}

/// Payload of `user_status_change`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    /// Whose presence changed.
    pub user_id: UserId,
    /// New state.
    pub status: PresenceStatus,
    /// Set on `offline`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl StatusChange {
    /// The user just registered a connection.
    pub fn online(user_id: UserId) -> Self {
        Self {
            user_id,
            status: PresenceStatus::Online,
            last_seen: None,
        }
    }

    /// The user's routed connection just closed.
    pub fn offline(user_id: UserId, last_seen: DateTime<Utc>) -> Self {
        Self {
            user_id,
            status: PresenceStatus::Offline,
            last_seen: Some(last_seen),
        }
    }
}

/// Presence state carried by `user_status_change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// Connected.
    Online,
    /// Disconnected.
    Offline,
}

/// Payload of `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Machine-readable code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
}

/// Error codes sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Frame was not JSON, too large, or named an unknown event.
    InvalidMessage,
    /// Payload failed validation.
    ValidationError,
    /// `sendMessage` could not be persisted; nothing was delivered.
    MessageNotSent,
    /// A collaborator failed.
    InternalError,
}

impl ErrorCode {
    /// Default code for an application error.
    pub fn for_error(err: &AppError) -> Self {
        match err.kind {
            ErrorKind::Validation => Self::ValidationError,
            ErrorKind::Serialization => Self::InvalidMessage,
            _ => Self::InternalError,
        }
    }
}
