//! Verified caller identity.

use serde::{Deserialize, Serialize};

use mathquest_core::types::UserId;

use super::role::UserRole;

/// The `{userId, role}` pair produced by token verification.
///
/// Attached to a connection once, at the handshake, and passed by value to
/// every handler that acts on behalf of that connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Authenticated user.
    pub user_id: UserId,
    /// Role claimed by the token.
    pub role: UserRole,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Whether the caller is a teacher.
    pub fn is_teacher(&self) -> bool {
        matches!(self.role, UserRole::Teacher)
    }
}
