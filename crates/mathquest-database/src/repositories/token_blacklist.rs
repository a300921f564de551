//! Revoked token repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mathquest_core::error::{AppError, ErrorKind};
use mathquest_core::result::AppResult;

/// Repository for the `token_blacklist` table written by the REST API on logout.
#[derive(Debug, Clone)]
pub struct TokenBlacklistRepository {
    pool: PgPool,
}

impl TokenBlacklistRepository {
    /// Create a new token blacklist repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether the exact token string has been revoked and not yet expired.
    pub async fn contains(&self, token: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM token_blacklist WHERE token = $1 AND expires_at > NOW())",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check token blacklist", e))
    }

    /// Revoke a token until its natural expiry.
    pub async fn insert(&self, token: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO token_blacklist (token, expires_at) VALUES ($1, $2) \
             ON CONFLICT (token) DO NOTHING",
        )
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to blacklist token", e))?;
        Ok(())
    }
}
