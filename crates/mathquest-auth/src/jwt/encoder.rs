//! JWT signing, for tooling and tests.
//!
//! Production tokens are issued by the REST API with the same secret and
//! claims layout.

use chrono::Duration;
use jsonwebtoken::{EncodingKey, Header, encode};

use mathquest_core::config::AuthConfig;
use mathquest_core::error::{AppError, ErrorKind};
use mathquest_core::result::AppResult;
use mathquest_entity::Identity;

use super::claims::{Claims, TokenType};

/// Creates signed HS256 tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    access_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::minutes(config.jwt_access_ttl_minutes as i64),
        }
    }

    /// Issue an access token with the configured TTL.
    pub fn issue_access_token(&self, identity: Identity) -> AppResult<String> {
        self.issue(identity, TokenType::Access, self.access_ttl)
    }

    /// Issue a token of any type and lifetime. A negative `ttl` yields an
    /// already-expired token.
    pub fn issue(&self, identity: Identity, token_type: TokenType, ttl: Duration) -> AppResult<String> {
        self.encode(&Claims::new(identity, token_type, ttl))
    }

    /// Sign arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to encode token", e)
        })
    }
}
