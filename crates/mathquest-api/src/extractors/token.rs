//! Access token extraction for the WebSocket handshake.
//!
//! Browsers cannot set headers on a WebSocket upgrade, so the token may
//! arrive either as `Authorization: Bearer <token>` or as the `token` query
//! parameter. The header wins when both are present.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::Deserialize;

/// The raw access token offered at the handshake, if any.
///
/// Extraction never fails; a missing token is rejected by the gateway so
/// that every rejection goes through the same path.
#[derive(Debug, Clone, Default)]
pub struct HandshakeToken(pub Option<String>);

#[derive(Debug, Deserialize)]
struct HandshakeQuery {
    token: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for HandshakeToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);

        let from_query = || {
            Query::<HandshakeQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(query)| query.token)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        };

        Ok(Self(from_header.or_else(from_query)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Option<String> {
        let (mut parts, _) = request.into_parts();
        let HandshakeToken(token) = HandshakeToken::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        token
    }

    #[tokio::test]
    async fn test_bearer_header() {
        let request = Request::builder()
            .uri("/ws")
            .header(AUTHORIZATION, "Bearer abc.def.ghi")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.as_deref(), Some("abc.def.ghi"));
    }

    #[tokio::test]
    async fn test_query_parameter() {
        let request = Request::builder()
            .uri("/ws?foo=1&token=xyz")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.as_deref(), Some("xyz"));
    }

    #[tokio::test]
    async fn test_query_parameter_is_percent_decoded() {
        let request = Request::builder()
            .uri("/ws?token=abc%2Bdef%3D%3D")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.as_deref(), Some("abc+def=="));
    }

    #[tokio::test]
    async fn test_header_wins_over_query() {
        let request = Request::builder()
            .uri("/ws?token=from-query")
            .header(AUTHORIZATION, "Bearer from-header")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.as_deref(), Some("from-header"));
    }

    #[tokio::test]
    async fn test_missing_or_blank() {
        let request = Request::builder().uri("/ws?token=").body(()).unwrap();
        assert_eq!(extract(request).await, None);

        let request = Request::builder()
            .uri("/ws")
            .header(AUTHORIZATION, "Basic dXNlcg==")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await, None);
    }
}
