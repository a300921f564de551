//! Top-level realtime gateway that ties together all subsystems.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use mathquest_auth::TokenVerifier;
use mathquest_core::config::RealtimeConfig;
use mathquest_core::error::{AppError, ErrorKind};
use mathquest_core::result::AppResult;
use mathquest_database::DirectoryStore;
use mathquest_entity::Identity;

use crate::chat::handler::ChatHandler;
use crate::connection::authenticator::WsAuthenticator;
use crate::connection::handle::ConnectionHandle;
use crate::connection::manager::ConnectionManager;
use crate::message::codec::FrameCodec;
use crate::message::types::{ErrorCode, InboundMessage, OutboundMessage};
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};
use crate::notification::dispatcher::NotificationDispatcher;
use crate::presence::registry::PresenceRegistry;

/// The realtime gateway: authenticates connections, keeps presence, and
/// routes chat requests.
///
/// One instance is shared by every socket task through `Arc`.
#[derive(Debug)]
pub struct RealtimeGateway {
    /// Live connections, rooms, and delivery.
    pub connections: Arc<ConnectionManager>,
    /// Presence registry.
    pub presence: Arc<PresenceRegistry>,
    /// Chat request handlers.
    pub chat: Arc<ChatHandler>,
    /// Server-initiated pushes.
    pub notifications: Arc<NotificationDispatcher>,
    /// Gateway counters.
    pub metrics: Arc<RealtimeMetrics>,
    authenticator: WsAuthenticator,
    codec: FrameCodec,
}

/// Point-in-time gateway statistics for the health endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayStats {
    /// Open connections.
    pub connections: usize,
    /// Users with a presence route.
    pub online_users: usize,
    /// Counters.
    pub metrics: MetricsSnapshot,
}

impl RealtimeGateway {
    /// Creates a new gateway with all subsystems.
    pub fn new(
        config: &RealtimeConfig,
        verifier: Arc<dyn TokenVerifier>,
        directory: Arc<dyn DirectoryStore>,
    ) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let presence = Arc::new(PresenceRegistry::new());
        let connections = Arc::new(ConnectionManager::new(
            config,
            presence.clone(),
            metrics.clone(),
        ));
        let chat = Arc::new(ChatHandler::new(
            directory.clone(),
            connections.clone(),
            metrics.clone(),
        ));
        let notifications = Arc::new(NotificationDispatcher::new(
            connections.clone(),
            chat.clone(),
            directory,
        ));
        let authenticator = WsAuthenticator::new(
            verifier,
            Duration::from_secs(config.handshake_timeout_seconds),
        );

        info!(
            handshake_timeout_seconds = config.handshake_timeout_seconds,
            channel_buffer_size = config.channel_buffer_size,
            "Realtime gateway initialized"
        );

        Self {
            connections,
            presence,
            chat,
            notifications,
            metrics,
            authenticator,
            codec: FrameCodec::from_config(config),
        }
    }

    /// Run the handshake for a connection attempt.
    ///
    /// Nothing is registered here; a rejected attempt leaves no trace beyond
    /// the rejection counter.
    pub async fn authenticate(&self, token: Option<&str>) -> AppResult<Identity> {
        match self.authenticator.authenticate(token).await {
            Ok(identity) => Ok(identity),
            Err(e) => {
                self.metrics.handshake_rejected();
                warn!(error = %e, "WebSocket handshake rejected");
                Err(e)
            }
        }
    }

    /// Register an authenticated connection. See [`ConnectionManager::register`].
    pub fn connect(
        &self,
        identity: Identity,
    ) -> (Arc<ConnectionHandle>, tokio::sync::mpsc::Receiver<String>) {
        self.connections.register(identity)
    }

    /// Clean up after a connection closed for any reason.
    pub fn disconnect(&self, handle: &ConnectionHandle) {
        self.connections.unregister(&handle.id);
    }

    /// Handle one inbound text frame. The caller awaits this before reading
    /// the next frame, so requests of one connection are served in order.
    pub async fn handle_frame(&self, handle: &ConnectionHandle, raw: &str) {
        self.metrics.frame_received();

        let request = match self.codec.decode(raw) {
            Ok(request) => request,
            Err(e) => {
                debug!(conn_id = %handle.id, error = %e, "Rejected inbound frame");
                self.reply_error(handle, OutboundMessage::error(&e));
                return;
            }
        };

        debug!(
            conn_id = %handle.id,
            user_id = %handle.user_id(),
            event = request.event_name(),
            "Inbound request"
        );
        self.dispatch(handle, request).await;
    }

    async fn dispatch(&self, handle: &ConnectionHandle, request: InboundMessage) {
        let caller = handle.identity;
        let event = request.event_name();

        let reply = match request {
            InboundMessage::GetUsers => self
                .chat
                .get_users(caller)
                .await
                .map(OutboundMessage::Users),
            InboundMessage::GetMessages { counterpart_id } => self
                .chat
                .get_messages(caller, counterpart_id)
                .await
                .map(OutboundMessage::Messages),
            InboundMessage::GetUnreadSummary => self
                .chat
                .unread_summary(caller)
                .await
                .map(OutboundMessage::UnreadSummary),
            InboundMessage::SendMessage {
                recipient_id,
                content,
            } => match self.chat.send_message(caller, recipient_id, content).await {
                Ok(chat) => Ok(OutboundMessage::Message(chat)),
                Err(e) => {
                    self.log_failure(handle, event, &e);
                    let reply = if e.kind == ErrorKind::Validation {
                        OutboundMessage::error(&e)
                    } else {
                        OutboundMessage::error_with_code(
                            ErrorCode::MessageNotSent,
                            "Message could not be sent",
                        )
                    };
                    self.reply_error(handle, reply);
                    return;
                }
            },
        };

        match reply {
            Ok(message) => {
                self.connections.send_to_connection(handle, &message);
            }
            Err(e) => {
                self.log_failure(handle, event, &e);
                self.reply_error(handle, OutboundMessage::error(&e));
            }
        }
    }

    fn log_failure(&self, handle: &ConnectionHandle, event: &str, err: &AppError) {
        if err.is_client_error() {
            debug!(conn_id = %handle.id, event, error = %err, "Request rejected");
        } else {
            error!(conn_id = %handle.id, event, error = %err, "Request failed");
        }
    }

    fn reply_error(&self, handle: &ConnectionHandle, message: OutboundMessage) {
        self.metrics.error_sent();
        self.connections.send_to_connection(handle, &message);
    }

    /// Current statistics.
    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            connections: self.connections.connection_count(),
            online_users: self.presence.online_count(),
            metrics: self.metrics.snapshot(),
        }
    }

    /// Ask every connection to close.
    pub fn shutdown(&self) {
        info!("Shutting down realtime gateway");
        let closed = self.connections.close_all();
        info!(closed, "Realtime gateway shut down");
    }
}
