//! Decoding of client frames.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use mathquest_core::config::RealtimeConfig;
use mathquest_core::error::{AppError, ErrorKind};
use mathquest_core::result::AppResult;
use mathquest_core::types::UserId;

use super::request::{GetMessagesRequest, SendMessageRequest};
use super::types::InboundMessage;
use super::validator::{validate_content_length, validate_frame, validate_request};

#[derive(Debug, Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Decodes client frames into validated requests.
///
/// Decode failures carry `ErrorKind::Serialization` when the frame itself is
/// unusable (`INVALID_MESSAGE`) and `ErrorKind::Validation` when a known
/// event has a bad payload (`VALIDATION_ERROR`).
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_frame_bytes: usize,
    max_message_length: usize,
}

impl FrameCodec {
    /// Create a codec with explicit limits.
    pub fn new(max_frame_bytes: usize, max_message_length: usize) -> Self {
        Self {
            max_frame_bytes,
            max_message_length,
        }
    }

    /// Create a codec from the `[realtime]` configuration section.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self::new(config.max_frame_bytes, config.max_message_length as usize)
    }

    /// Decode and validate one text frame.
    pub fn decode(&self, raw: &str) -> AppResult<InboundMessage> {
        validate_frame(raw, self.max_frame_bytes)?;

        let frame: RawFrame = serde_json::from_str(raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Failed to parse frame: {e}"),
                e,
            )
        })?;

        match frame.event.as_str() {
            "getUsers" => Ok(InboundMessage::GetUsers),
            "getUnreadSummary" => Ok(InboundMessage::GetUnreadSummary),
            "getMessages" => {
                let request: GetMessagesRequest = payload(frame.data)?;
                validate_request(&request)?;
                Ok(InboundMessage::GetMessages {
                    counterpart_id: parse_user_id(request.user_id, "userId")?,
                })
            }
            "sendMessage" => {
                let request: SendMessageRequest = payload(frame.data)?;
                validate_request(&request)?;
                let content = request.content.unwrap_or_default().trim().to_string();
                validate_content_length(&content, self.max_message_length)?;
                Ok(InboundMessage::SendMessage {
                    recipient_id: parse_user_id(request.recipient_id, "recipientId")?,
                    content,
                })
            }
            other => Err(AppError::new(
                ErrorKind::Serialization,
                format!("Unknown event '{other}'"),
            )),
        }
    }
}

fn payload<T: DeserializeOwned + Default>(data: serde_json::Value) -> AppResult<T> {
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data)
        .map_err(|e| AppError::with_source(ErrorKind::Validation, format!("Invalid payload: {e}"), e))
}

fn parse_user_id(value: Option<String>, field: &str) -> AppResult<UserId> {
    value
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| AppError::validation(format!("{field} is not a valid id")))
}
