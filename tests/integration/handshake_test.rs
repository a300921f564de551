//! Integration tests for the WebSocket handshake.

mod helpers;

use std::time::Duration as StdDuration;

use chrono::Duration;
use serde_json::Value;

use mathquest_auth::{TokenBlocklist, TokenType};
use mathquest_entity::Identity;

use helpers::{TestServer, assert_no_event, expect_event, send_event};

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let server = TestServer::start().await;
    assert_eq!(server.rejected_status(None).await, 401);
    assert_eq!(server.state.gateway.stats().connections, 0);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let server = TestServer::start().await;
    assert_eq!(server.rejected_status(Some("not.a.jwt")).await, 401);
}

#[tokio::test]
async fn test_expired_token_is_rejected_without_broadcast() {
    let server = TestServer::start().await;
    let (teacher, student) = server.add_pair().await;
    let mut student_ws = server.connect(&student).await;
    let token = server
        .encoder
        .issue(
            Identity::new(teacher.id, teacher.role),
            TokenType::Access,
            Duration::hours(-1),
        )
        .expect("token");
    assert_eq!(server.rejected_status(Some(&token)).await, 401);

    assert_no_event(&mut student_ws, "user_status_change", StdDuration::from_millis(300)).await;
    assert!(!server.state.gateway.presence.is_online(teacher.id));
}

#[tokio::test]
async fn test_refresh_token_is_rejected() {
    let server = TestServer::start().await;
    let (teacher, _) = server.add_pair().await;
    let token = server
        .encoder
        .issue(
            Identity::new(teacher.id, teacher.role),
            TokenType::Refresh,
            Duration::days(7),
        )
        .expect("token");
    assert_eq!(server.rejected_status(Some(&token)).await, 401);
}

#[tokio::test]
async fn test_revoked_token_is_rejected() {
    let server = TestServer::start().await;
    let (teacher, _) = server.add_pair().await;
    let token = server.token_for(&teacher);
    server
        .blocklist
        .revoke(&token, chrono::Utc::now() + Duration::minutes(15))
        .await
        .expect("revoke");
    assert_eq!(server.rejected_status(Some(&token)).await, 401);
}

#[tokio::test]
async fn test_bearer_header_is_accepted() {
    let server = TestServer::start().await;
    let (teacher, student) = server.add_pair().await;
    let mut ws = server.connect_with_header(&teacher).await;

    send_event(&mut ws, "getUsers", Value::Null).await;
    let users = expect_event(&mut ws, "users").await;
    assert_eq!(users[0]["id"], student.id.to_string());
    assert!(server.state.gateway.presence.is_online(teacher.id));
}

#[tokio::test]
async fn test_rejections_are_counted() {
    let server = TestServer::start().await;
    server.rejected_status(None).await;
    server.rejected_status(Some("bogus")).await;
    assert_eq!(server.state.gateway.stats().metrics.handshakes_rejected, 2);
}
