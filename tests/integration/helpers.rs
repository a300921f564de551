//! Shared test helpers for integration tests.
//!
//! Each test starts a real server on an ephemeral port, backed by the
//! in-memory directory store, and talks to it with tokio-tungstenite.

#![allow(dead_code)]

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use mathquest_api::{AppState, build_app};
use mathquest_auth::{JwtDecoder, JwtEncoder, MemoryTokenBlocklist, TokenBlocklist};
use mathquest_core::config::{AppConfig, DirectoryProvider};
use mathquest_core::types::UserId;
use mathquest_database::MemoryDirectoryStore;
use mathquest_entity::{Identity, User, UserRole};
use mathquest_realtime::RealtimeGateway;

/// A connected WebSocket client.
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a test waits for an expected frame.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Test server context
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: MemoryDirectoryStore,
    pub blocklist: Arc<MemoryTokenBlocklist>,
    pub state: AppState,
    pub encoder: JwtEncoder,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with test defaults.
    pub async fn start() -> Self {
        let mut config = AppConfig::default();
        config.database.provider = DirectoryProvider::Memory;
        config.auth.jwt_secret = "integration-test-secret".to_string();
        config.realtime.handshake_timeout_seconds = 2;
        Self::start_with(config).await
    }

    /// Start a server with the given configuration.
    pub async fn start_with(config: AppConfig) -> Self {
        let store = MemoryDirectoryStore::new();
        let blocklist = Arc::new(MemoryTokenBlocklist::new());
        let verifier = Arc::new(JwtDecoder::new(
            &config.auth,
            blocklist.clone() as Arc<dyn TokenBlocklist>,
        ));
        let gateway = Arc::new(RealtimeGateway::new(
            &config.realtime,
            verifier,
            Arc::new(store.clone()),
        ));
        let encoder = JwtEncoder::new(&config.auth);
        let state = AppState::new(config, gateway, Arc::new(store.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let app = build_app(state.clone());
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .into_future()
                .await
                .expect("test server");
        });

        Self {
            addr,
            store,
            blocklist,
            state,
            encoder,
            task,
        }
    }

    /// Add a user to the directory.
    pub async fn add_user(&self, first_name: &str, role: UserRole) -> User {
        let user = User {
            id: UserId::new(),
            email: format!("{}@example.com", first_name.to_lowercase()),
            first_name: Some(first_name.to_string()),
            last_name: Some("Tester".to_string()),
            role,
            last_active: None,
        };
        self.store.add_user(user.clone()).await;
        user
    }

    /// Add an assigned teacher/student pair.
    pub async fn add_pair(&self) -> (User, User) {
        let teacher = self.add_user("Grace", UserRole::Teacher).await;
        let student = self.add_user("Ada", UserRole::Student).await;
        self.store.assign(teacher.id, student.id).await;
        (teacher, student)
    }

    /// Mint a valid access token for a user.
    pub fn token_for(&self, user: &User) -> String {
        self.encoder
            .issue_access_token(Identity::new(user.id, user.role))
            .expect("issue token")
    }

    /// WebSocket URL, with the token as a query parameter when given.
    pub fn ws_url(&self, token: Option<&str>) -> String {
        match token {
            Some(token) => format!("ws://{}/ws?token={}", self.addr, token),
            None => format!("ws://{}/ws", self.addr),
        }
    }

    /// Connect as a user, passing the token in the query string.
    pub async fn connect(&self, user: &User) -> WsClient {
        let token = self.token_for(user);
        let (mut ws, _) = connect_async(self.ws_url(Some(&token)))
            .await
            .expect("websocket connect");
        wait_registered(&mut ws).await;
        ws
    }

    /// Connect as a user, passing the token in the `Authorization` header.
    pub async fn connect_with_header(&self, user: &User) -> WsClient {
        let mut request = self
            .ws_url(None)
            .into_client_request()
            .expect("client request");
        let bearer = format!("Bearer {}", self.token_for(user));
        request.headers_mut().insert(
            "Authorization",
            HeaderValue::from_str(&bearer).expect("header value"),
        );
        let (mut ws, _) = connect_async(request).await.expect("websocket connect");
        wait_registered(&mut ws).await;
        ws
    }

    /// Attempt a handshake and return the HTTP status of a rejection.
    pub async fn rejected_status(&self, token: Option<&str>) -> u16 {
        match connect_async(self.ws_url(token)).await {
            Ok(_) => panic!("handshake unexpectedly succeeded"),
            Err(tungstenite::Error::Http(response)) => response.status().as_u16(),
            Err(e) => panic!("unexpected handshake error: {e}"),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Registration finishes after the 101 response; one round trip proves the
/// connection is live on the server.
async fn wait_registered(ws: &mut WsClient) {
    send_event(ws, "getUnreadSummary", Value::Null).await;
    expect_event(ws, "unread_summary").await;
}

/// Send a client event.
pub async fn send_event(ws: &mut WsClient, event: &str, data: Value) {
    let frame = json!({ "event": event, "data": data }).to_string();
    send_raw(ws, &frame).await;
}

/// Send a raw text frame.
pub async fn send_raw(ws: &mut WsClient, frame: &str) {
    ws.send(Message::text(frame)).await.expect("send frame");
}

/// Wait for the next text frame and parse it.
pub async fn next_frame(ws: &mut WsClient) -> Value {
    loop {
        let message = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).expect("server frame is JSON");
        }
    }
}

/// Wait for a frame with the given event name, skipping others.
pub async fn expect_event(ws: &mut WsClient, event: &str) -> Value {
    loop {
        let frame = next_frame(ws).await;
        if frame["event"] == event {
            return frame["data"].clone();
        }
    }
}

/// Wait for a status change about `user_id` with the given status.
pub async fn expect_status(ws: &mut WsClient, user_id: UserId, status: &str) -> Value {
    loop {
        let data = expect_event(ws, "user_status_change").await;
        if data["userId"] == user_id.to_string() && data["status"] == status {
            return data;
        }
    }
}

/// Assert that no frame with the given event arrives within `window`.
pub async fn assert_no_event(ws: &mut WsClient, event: &str, window: Duration) {
    let deadline = tokio::time::Instant::now() + window;
    loop {
        match tokio::time::timeout_at(deadline, ws.next()).await {
            Err(_) => return,
            Ok(Some(Ok(Message::Text(text)))) => {
                let frame: Value = serde_json::from_str(text.as_str()).expect("JSON frame");
                assert_ne!(frame["event"], event, "unexpected frame: {frame}");
            }
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(_))) | Ok(None) => return,
        }
    }
}

/// Wait until the server has closed the stream.
pub async fn expect_closed(ws: &mut WsClient) {
    loop {
        match tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for close")
        {
            None | Some(Ok(Message::Close(_))) | Some(Err(_)) => return,
            Some(Ok(_)) => {}
        }
    }
}
