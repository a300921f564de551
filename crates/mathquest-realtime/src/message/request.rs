//! Raw request payloads as sent by the web client.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use mathquest_core::types::UserId;

/// Payload of `getMessages`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GetMessagesRequest {
    /// The other participant.
    #[validate(
        required(message = "userId is required"),
        custom(function = "validate_user_id", message = "userId is not a valid id")
    )]
    pub user_id: Option<String>,
}

/// Payload of `sendMessage`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Addressee.
    #[validate(
        required(message = "recipientId is required"),
        custom(function = "validate_user_id", message = "recipientId is not a valid id")
    )]
    pub recipient_id: Option<String>,
    /// Message text.
    #[validate(
        required(message = "content is required"),
        custom(function = "validate_not_blank", message = "content must not be empty")
    )]
    pub content: Option<String>,
}

fn validate_user_id(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<UserId>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("user_id"))
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}
