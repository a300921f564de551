//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, mpsc};
use tracing::warn;

use mathquest_core::types::{ConnectionId, UserId};
use mathquest_entity::Identity;

/// Result of queueing a frame on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Frame queued for the writer task.
    Queued,
    /// Outbound queue full; frame dropped.
    Dropped,
    /// Connection already closed.
    Closed,
}

/// A handle to one authenticated WebSocket connection.
///
/// Holds the sender half of the connection's bounded outbound queue; the
/// writer task owns the receiver.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Gateway-assigned connection ID.
    pub id: ConnectionId,
    /// Identity verified at the handshake.
    pub identity: Identity,
    /// When the connection was registered.
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<String>,
    alive: AtomicBool,
    close_signal: Notify,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(identity: Identity, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            identity,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
            close_signal: Notify::new(),
        }
    }

    /// The user that owns this connection.
    pub fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    /// Queue a text frame without waiting.
    pub fn send(&self, frame: String) -> Delivery {
        if !self.is_alive() {
            return Delivery::Closed;
        }
        match self.sender.try_send(frame) {
            Ok(()) => Delivery::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Send buffer full, dropping frame");
                Delivery::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                Delivery::Closed
            }
        }
    }

    /// Check if connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Ask the socket task to close this connection.
    pub fn close(&self) {
        self.mark_dead();
        self.close_signal.notify_one();
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub async fn closed(&self) {
        self.close_signal.notified().await;
    }
}
