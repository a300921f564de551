//! WebSocket upgrade handler.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use mathquest_entity::Identity;
use mathquest_realtime::ConnectionHandle;

use crate::error::ApiError;
use crate::extractors::HandshakeToken;
use crate::state::AppState;

/// How long the writer may keep flushing after the read side ended.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// GET /ws — WebSocket upgrade.
///
/// The token is verified before the upgrade is accepted, so a rejected
/// client gets a plain `401` and never becomes a connection.
pub async fn ws_handler(
    State(state): State<AppState>,
    HandshakeToken(token): HandshakeToken,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let identity = match state.gateway.authenticate(token.as_deref()).await {
        Ok(identity) => identity,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match ws {
        Ok(ws) => ws.on_upgrade(move |socket| handle_ws_connection(state, identity, socket)),
        Err(rejection) => rejection.into_response(),
    }
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, identity: Identity, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (handle, mut outbound_rx) = state.gateway.connect(identity);
    let conn_id = handle.id;

    info!(
        conn_id = %conn_id,
        user_id = %identity.user_id,
        role = %identity.role,
        "WebSocket connection established"
    );

    // Ends when every sender is gone, then closes the socket.
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        let _ = ws_tx.close().await;
    });

    read_loop(&state, &handle, &mut ws_rx).await;

    state.gateway.disconnect(&handle);
    drop(handle);

    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer)
        .await
        .is_err()
    {
        writer.abort();
    }

    info!(
        conn_id = %conn_id,
        user_id = %identity.user_id,
        "WebSocket connection closed"
    );
}

/// Serves inbound frames one at a time until the peer leaves, the transport
/// fails, or the gateway closes the connection.
async fn read_loop(
    state: &AppState,
    handle: &Arc<ConnectionHandle>,
    ws_rx: &mut futures::stream::SplitStream<WebSocket>,
) {
    loop {
        tokio::select! {
            _ = handle.closed() => {
                debug!(conn_id = %handle.id, "Connection closed by server");
                return;
            }
            next = ws_rx.next() => match next {
                Some(Ok(Message::Text(text))) => {
                    state.gateway.handle_frame(handle, text.as_str()).await;
                }
                Some(Ok(Message::Binary(_))) => {
                    debug!(conn_id = %handle.id, "Ignoring binary frame");
                }
                Some(Ok(Message::Close(_))) | None => return,
                // Ping/pong are answered by axum.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %handle.id, error = %e, "WebSocket error");
                    return;
                }
            }
        }
    }
}
