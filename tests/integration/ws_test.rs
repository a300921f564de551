//! Integration tests for WebSocket presence and messaging.

mod helpers;

use std::time::Duration;

use serde_json::{Value, json};

use helpers::{
    TestServer, assert_no_event, expect_closed, expect_event, expect_status, send_event, send_raw,
};

#[tokio::test]
async fn test_directory_lists_assigned_counterparts_with_presence() {
    let server = TestServer::start().await;
    let (teacher, student) = server.add_pair().await;
    let other = server
        .add_user("Linus", mathquest_entity::UserRole::Student)
        .await;

    let _student_ws = server.connect(&student).await;
    let mut teacher_ws = server.connect(&teacher).await;

    send_event(&mut teacher_ws, "getUsers", Value::Null).await;
    let users = expect_event(&mut teacher_ws, "users").await;
    let users = users.as_array().expect("users array");

    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], student.id.to_string());
    assert_eq!(users[0]["name"], "Ada Tester");
    assert_eq!(users[0]["role"], "student");
    assert_eq!(users[0]["isOnline"], true);
    assert!(users.iter().all(|u| u["id"] != other.id.to_string()));
}

#[tokio::test]
async fn test_message_round_trip_and_unread_flow() {
    let server = TestServer::start().await;
    let (teacher, student) = server.add_pair().await;

    let mut teacher_ws = server.connect(&teacher).await;
    let mut student_ws = server.connect(&student).await;

    send_event(
        &mut teacher_ws,
        "sendMessage",
        json!({ "recipientId": student.id.to_string(), "content": "  Great work today!  " }),
    )
    .await;

    let echo = expect_event(&mut teacher_ws, "message").await;
    assert_eq!(echo["content"], "Great work today!");
    assert_eq!(echo["senderName"], "Grace Tester");
    assert_eq!(echo["senderRole"], "teacher");

    let delivered = expect_event(&mut student_ws, "message").await;
    assert_eq!(delivered["id"], echo["id"]);
    assert_eq!(delivered["senderId"], teacher.id.to_string());
    assert_eq!(delivered["read"], false);

    send_event(&mut student_ws, "getUnreadSummary", Value::Null).await;
    let summary = expect_event(&mut student_ws, "unread_summary").await;
    assert_eq!(summary[teacher.id.to_string()], 1);

    send_event(
        &mut student_ws,
        "getMessages",
        json!({ "userId": teacher.id.to_string() }),
    )
    .await;
    let history = expect_event(&mut student_ws, "messages").await;
    let history = history.as_array().expect("history array");
    assert_eq!(history.len(), 1);
    // History reflects the state before this fetch marked it read.
    assert_eq!(history[0]["read"], false);

    send_event(&mut student_ws, "getUnreadSummary", Value::Null).await;
    let summary = expect_event(&mut student_ws, "unread_summary").await;
    assert_eq!(summary, json!({}));

    let stored = server.store.all_messages().await;
    assert_eq!(stored.len(), 1);
    assert!(stored[0].read);
}

#[tokio::test]
async fn test_message_to_offline_user_is_persisted() {
    let server = TestServer::start().await;
    let (teacher, student) = server.add_pair().await;

    let mut teacher_ws = server.connect(&teacher).await;
    send_event(
        &mut teacher_ws,
        "sendMessage",
        json!({ "recipientId": student.id.to_string(), "content": "See you tomorrow" }),
    )
    .await;
    expect_event(&mut teacher_ws, "message").await;

    let mut student_ws = server.connect(&student).await;
    send_event(
        &mut student_ws,
        "getMessages",
        json!({ "userId": teacher.id.to_string() }),
    )
    .await;
    let history = expect_event(&mut student_ws, "messages").await;
    assert_eq!(history[0]["content"], "See you tomorrow");
}

#[tokio::test]
async fn test_presence_online_and_offline_broadcasts() {
    let server = TestServer::start().await;
    let (teacher, student) = server.add_pair().await;

    let mut student_ws = server.connect(&student).await;
    let mut teacher_ws = server.connect(&teacher).await;

    let online = expect_status(&mut student_ws, teacher.id, "online").await;
    assert!(online.get("lastSeen").is_none());

    teacher_ws.close(None).await.expect("close");
    let offline = expect_status(&mut student_ws, teacher.id, "offline").await;
    assert!(offline["lastSeen"].is_string());

    assert!(!server.state.gateway.presence.is_online(teacher.id));
}

#[tokio::test]
async fn test_reconnect_moves_route_to_newest_connection() {
    let server = TestServer::start().await;
    let (teacher, student) = server.add_pair().await;

    let mut teacher_ws = server.connect(&teacher).await;
    let mut first = server.connect(&student).await;
    let mut second = server.connect(&student).await;

    send_event(
        &mut teacher_ws,
        "sendMessage",
        json!({ "recipientId": student.id.to_string(), "content": "Which tab am I in?" }),
    )
    .await;
    expect_event(&mut teacher_ws, "message").await;

    expect_event(&mut second, "message").await;
    assert_no_event(&mut first, "message", Duration::from_millis(300)).await;

    // The stale connection leaving must not mark the user offline.
    first.close(None).await.expect("close");
    assert_no_event(&mut teacher_ws, "user_status_change", Duration::from_millis(300)).await;
    assert!(server.state.gateway.presence.is_online(student.id));
}

#[tokio::test]
async fn test_closing_newest_connection_falls_back_to_older() {
    let server = TestServer::start().await;
    let (teacher, student) = server.add_pair().await;

    let mut teacher_ws = server.connect(&teacher).await;
    let mut older = server.connect(&student).await;
    let mut newer = server.connect(&student).await;

    newer.close(None).await.expect("close");
    expect_closed(&mut newer).await;
    assert_no_event(&mut teacher_ws, "user_status_change", Duration::from_millis(300)).await;
    assert!(server.state.gateway.presence.is_online(student.id));

    send_event(
        &mut teacher_ws,
        "sendMessage",
        json!({ "recipientId": student.id.to_string(), "content": "Still there?" }),
    )
    .await;
    let delivered = expect_event(&mut older, "message").await;
    assert_eq!(delivered["content"], "Still there?");

    older.close(None).await.expect("close");
    let offline = expect_status(&mut teacher_ws, student.id, "offline").await;
    assert!(offline["lastSeen"].is_string());
}

#[tokio::test]
async fn test_bad_frames_get_error_events_and_connection_survives() {
    let server = TestServer::start().await;
    let (teacher, _student) = server.add_pair().await;
    let mut ws = server.connect(&teacher).await;

    send_raw(&mut ws, "this is not json").await;
    let error = expect_event(&mut ws, "error").await;
    assert_eq!(error["code"], "INVALID_MESSAGE");

    send_event(&mut ws, "teleport", json!({})).await;
    let error = expect_event(&mut ws, "error").await;
    assert_eq!(error["code"], "INVALID_MESSAGE");

    send_event(&mut ws, "getMessages", json!({ "userId": "not-a-uuid" })).await;
    let error = expect_event(&mut ws, "error").await;
    assert_eq!(error["code"], "VALIDATION_ERROR");

    send_event(
        &mut ws,
        "sendMessage",
        json!({ "recipientId": uuid::Uuid::new_v4().to_string(), "content": "   " }),
    )
    .await;
    let error = expect_event(&mut ws, "error").await;
    assert_eq!(error["code"], "VALIDATION_ERROR");

    send_event(&mut ws, "getUsers", Value::Null).await;
    expect_event(&mut ws, "users").await;
}

#[tokio::test]
async fn test_store_outage_reports_message_not_sent() {
    let server = TestServer::start().await;
    let (teacher, student) = server.add_pair().await;
    let mut ws = server.connect(&teacher).await;

    server.store.set_unavailable(true);
    send_event(
        &mut ws,
        "sendMessage",
        json!({ "recipientId": student.id.to_string(), "content": "Hello?" }),
    )
    .await;
    let error = expect_event(&mut ws, "error").await;
    assert_eq!(error["code"], "MESSAGE_NOT_SENT");

    server.store.set_unavailable(false);
    assert!(server.store.all_messages().await.is_empty());
}

#[tokio::test]
async fn test_server_pushes_reach_online_user() {
    let server = TestServer::start().await;
    let (teacher, student) = server.add_pair().await;
    let mut student_ws = server.connect(&student).await;

    let notifications = &server.state.gateway.notifications;
    let reached = notifications.emit_progress(student.id, json!({ "lessonId": "l-1", "score": 80 }));
    assert_eq!(reached, 1);
    let progress = expect_event(&mut student_ws, "progress").await;
    assert_eq!(progress["score"], 80);

    let message = notifications
        .send_system_message(teacher.id, student.id, "Your lesson was reviewed")
        .await
        .expect("system message");
    let delivered = expect_event(&mut student_ws, "message").await;
    assert_eq!(delivered["id"], message.id.to_string());
    assert_eq!(delivered["senderId"], teacher.id.to_string());
}

#[tokio::test]
async fn test_shutdown_closes_connections() {
    let server = TestServer::start().await;
    let (teacher, _student) = server.add_pair().await;
    let mut ws = server.connect(&teacher).await;

    server.state.gateway.shutdown();
    expect_closed(&mut ws).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.state.gateway.stats().connections, 0);
}
