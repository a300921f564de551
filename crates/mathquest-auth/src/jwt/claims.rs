//! JWT claims shared with the REST API that issues the tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use mathquest_core::types::UserId;
use mathquest_entity::{Identity, UserRole};

/// Claims payload of an access or refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject user.
    pub user_id: UserId,
    /// Role at the time of issuance.
    pub role: UserRole,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Token type. Older tokens carry none and are treated as access tokens.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token presented on requests and handshakes.
    Access,
    /// Long-lived token only accepted by the refresh endpoint.
    Refresh,
}

impl Claims {
    /// Claims for `identity` valid for `ttl` from now.
    pub fn new(identity: Identity, token_type: TokenType, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id: identity.user_id,
            role: identity.role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            token_type: Some(token_type),
        }
    }

    /// The identity these claims were issued for.
    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id, self.role)
    }

    /// Whether these claims may authenticate a connection.
    pub fn is_access(&self) -> bool {
        !matches!(self.token_type, Some(TokenType::Refresh))
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
