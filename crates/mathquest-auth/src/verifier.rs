//! The token verification seam.

use async_trait::async_trait;

use mathquest_core::result::AppResult;
use mathquest_entity::Identity;

/// Turns a bearer token into the identity it was issued for.
///
/// Any rejection (malformed, bad signature, expired, wrong type, revoked)
/// is an `ErrorKind::Authentication` error. Other kinds mean the check itself
/// could not be carried out.
#[async_trait]
pub trait TokenVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Verify a bearer token.
    async fn verify(&self, token: &str) -> AppResult<Identity>;
}
