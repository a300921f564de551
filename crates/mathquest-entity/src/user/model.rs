//! User account row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mathquest_core::types::UserId;

use super::role::UserRole;

/// A user as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Primary key.
    #[sqlx(try_from = "Uuid")]
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Account role.
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    /// Last time the user was active, maintained by the REST API.
    pub last_active: Option<DateTime<Utc>>,
}

impl User {
    /// First and last name joined and trimmed. Empty when neither is set.
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    /// Name shown in contact lists: the full name, or the email without one.
    pub fn display_name(&self) -> String {
        let name = self.full_name();
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}
