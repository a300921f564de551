//! Directory entries returned to `getUsers`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mathquest_core::types::UserId;

use super::model::User;

/// A counterpart user visible to the caller, with live presence attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Lowercase role.
    pub role: String,
    /// Whether the user currently holds an authenticated connection.
    pub is_online: bool,
    /// Last persisted activity.
    pub last_seen: Option<DateTime<Utc>>,
}

impl DirectoryUser {
    /// Builds an entry from a stored user and a presence lookup result.
    pub fn from_user(user: &User, is_online: bool) -> Self {
        Self {
            id: user.id,
            name: user.display_name(),
            role: user.role.as_str().to_string(),
            is_online,
            last_seen: user.last_active,
        }
    }
}
