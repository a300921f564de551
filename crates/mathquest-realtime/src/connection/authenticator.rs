//! Handshake authentication: verifies the bearer token presented on the
//! upgrade request within a bounded time.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use mathquest_auth::TokenVerifier;
use mathquest_core::error::AppError;
use mathquest_core::result::AppResult;
use mathquest_entity::Identity;

/// Authenticates WebSocket connections before they are upgraded.
#[derive(Debug, Clone)]
pub struct WsAuthenticator {
    verifier: Arc<dyn TokenVerifier>,
    timeout: Duration,
}

impl WsAuthenticator {
    /// Creates a new authenticator.
    pub fn new(verifier: Arc<dyn TokenVerifier>, timeout: Duration) -> Self {
        Self { verifier, timeout }
    }

    /// Verify the handshake token.
    ///
    /// A missing token, any verifier rejection, and a verification that
    /// outlives the timeout all yield an authentication error.
    pub async fn authenticate(&self, token: Option<&str>) -> AppResult<Identity> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Missing access token"))?;

        match tokio::time::timeout(self.timeout, self.verifier.verify(token)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Handshake verification timed out");
                Err(AppError::authentication("Authentication timed out"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mathquest_core::error::ErrorKind;
    use mathquest_core::types::UserId;
    use mathquest_entity::UserRole;

    #[derive(Debug)]
    struct FixedVerifier {
        identity: Identity,
        delay: Duration,
    }

    #[async_trait]
    impl TokenVerifier for FixedVerifier {
        async fn verify(&self, token: &str) -> AppResult<Identity> {
            tokio::time::sleep(self.delay).await;
            if token == "good" {
                Ok(self.identity)
            } else {
                Err(AppError::authentication("Invalid token signature"))
            }
        }
    }

    fn authenticator(delay: Duration) -> (WsAuthenticator, Identity) {
        let identity = Identity::new(UserId::new(), UserRole::Student);
        let verifier = Arc::new(FixedVerifier { identity, delay });
        (
            WsAuthenticator::new(verifier, Duration::from_secs(5)),
            identity,
        )
    }

    #[tokio::test]
    async fn test_accepts_valid_token() {
        let (auth, identity) = authenticator(Duration::ZERO);
        assert_eq!(auth.authenticate(Some("good")).await.unwrap(), identity);
    }

    #[tokio::test]
    async fn test_rejects_missing_and_blank_tokens() {
        let (auth, _) = authenticator(Duration::ZERO);
        for token in [None, Some(""), Some("   ")] {
            let err = auth.authenticate(token).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Authentication);
        }
    }

    #[tokio::test]
    async fn test_rejects_invalid_token() {
        let (auth, _) = authenticator(Duration::ZERO);
        let err = auth.authenticate(Some("bad")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_verification_times_out() {
        let (auth, _) = authenticator(Duration::from_secs(60));
        let err = auth.authenticate(Some("good")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, "Authentication timed out");
    }
}
