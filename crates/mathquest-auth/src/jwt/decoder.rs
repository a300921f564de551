//! JWT validation and revocation checking.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use mathquest_core::config::AuthConfig;
use mathquest_core::error::{AppError, ErrorKind};
use mathquest_core::result::AppResult;
use mathquest_entity::Identity;

use super::claims::Claims;
use crate::blocklist::TokenBlocklist;
use crate::verifier::TokenVerifier;

/// Validates HS256 access tokens and checks them against the blocklist.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    blocklist: Arc<dyn TokenBlocklist>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .field("blocklist", &self.blocklist)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, blocklist: Arc<dyn TokenBlocklist>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            blocklist,
        }
    }

    /// Decodes and validates an access token.
    ///
    /// Checks, in order:
    /// 1. Signature and expiry
    /// 2. Token type is not `refresh`
    /// 3. The exact token string is not revoked
    pub async fn decode_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.decode_token(token)?;

        if !claims.is_access() {
            return Err(AppError::authentication(
                "Invalid token type: expected access token",
            ));
        }

        if self.blocklist.is_revoked(token).await? {
            return Err(AppError::authentication("Token has been revoked"));
        }

        Ok(claims)
    }

    fn decode_token(&self, token: &str) -> AppResult<Claims> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                let message = match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token has expired",
                    jsonwebtoken::errors::ErrorKind::InvalidToken => "Invalid token format",
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => "Invalid token signature",
                    _ => "Token validation failed",
                };
                AppError::with_source(ErrorKind::Authentication, message, e)
            })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl TokenVerifier for JwtDecoder {
    async fn verify(&self, token: &str) -> AppResult<Identity> {
        let claims = self.decode_access_token(token).await?;
        debug!(user_id = %claims.user_id, role = %claims.role, "Token verified");
        Ok(claims.identity())
    }
}
