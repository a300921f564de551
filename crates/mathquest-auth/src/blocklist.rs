//! Revoked token lookups.
//!
//! The REST API writes the raw token string into `token_blacklist` on
//! logout. The gateway only reads it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use mathquest_core::result::AppResult;
use mathquest_database::repositories::TokenBlacklistRepository;

/// Storage for revoked tokens.
#[async_trait]
pub trait TokenBlocklist: Send + Sync + std::fmt::Debug + 'static {
    /// Whether the token has been revoked.
    async fn is_revoked(&self, token: &str) -> AppResult<bool>;

    /// Revoke a token until `expires_at`.
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> AppResult<()>;
}

#[async_trait]
impl TokenBlocklist for TokenBlacklistRepository {
    async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        self.contains(token).await
    }

    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        self.insert(token, expires_at).await
    }
}

/// In-memory blocklist used with the memory directory provider and in tests.
#[derive(Debug, Default)]
pub struct MemoryTokenBlocklist {
    entries: DashMap<String, DateTime<Utc>>,
}

impl MemoryTokenBlocklist {
    /// Create an empty blocklist.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenBlocklist for MemoryTokenBlocklist {
    async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        let now = Utc::now();
        self.entries.retain(|_, expires_at| *expires_at > now);
        Ok(self.entries.contains_key(token))
    }

    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        self.entries.insert(token.to_string(), expires_at);
        Ok(())
    }
}
