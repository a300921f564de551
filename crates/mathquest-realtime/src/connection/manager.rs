//! Connection manager: lifecycle (register, unregister) and delivery.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use mathquest_core::config::RealtimeConfig;
use mathquest_core::types::{ConnectionId, UserId};
use mathquest_entity::Identity;

use crate::message::types::{OutboundMessage, StatusChange};
use crate::metrics::RealtimeMetrics;
use crate::presence::registry::{PresenceRegistry, Release};
use crate::room::registry::{RoomRegistry, personal_room};

use super::handle::{ConnectionHandle, Delivery};
use super::pool::ConnectionPool;

/// Owns every live connection and the bookkeeping attached to it.
#[derive(Debug)]
pub struct ConnectionManager {
    pool: ConnectionPool,
    rooms: RoomRegistry,
    presence: Arc<PresenceRegistry>,
    metrics: Arc<RealtimeMetrics>,
    channel_buffer_size: usize,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: &RealtimeConfig,
        presence: Arc<PresenceRegistry>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            pool: ConnectionPool::new(),
            rooms: RoomRegistry::new(),
            presence,
            metrics,
            channel_buffer_size: config.channel_buffer_size.max(1),
        }
    }

    /// Registers a newly authenticated connection.
    ///
    /// Adds it to the pool, joins the personal room, routes presence to it,
    /// then tells every connection (this one included) that the user is
    /// online. Returns the handle and the receiver the writer task drains.
    pub fn register(&self, identity: Identity) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(identity, tx));
        let user_id = identity.user_id;

        self.pool.add(handle.clone());
        self.rooms.join(personal_room(user_id), handle.id);
        if let Some(previous) = self.presence.register(user_id, handle.id) {
            debug!(
                conn_id = %handle.id,
                previous_conn_id = %previous,
                user_id = %user_id,
                "Presence route moved to newer connection"
            );
        }
        self.metrics.connection_opened();

        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            role = %identity.role,
            "WebSocket connection registered"
        );

        self.broadcast_all(&OutboundMessage::UserStatusChange(StatusChange::online(
            user_id,
        )));

        (handle, rx)
    }

    /// Unregisters a connection. Safe to call more than once.
    ///
    /// If this connection held the user's presence route and the user still
    /// has other open connections, the route moves to the newest of them.
    /// Returns `true` only when the user has no connection left, in which
    /// case everyone is told the user went offline.
    pub fn unregister(&self, conn_id: &ConnectionId) -> bool {
        let Some(handle) = self.pool.remove(conn_id) else {
            return false;
        };
        handle.mark_dead();
        self.rooms.leave_all(handle.id);
        self.metrics.connection_closed();

        let user_id = handle.user_id();
        let went_offline = self.release_route(user_id, handle.id);

        info!(
            conn_id = %conn_id,
            user_id = %user_id,
            went_offline,
            connected_seconds = (Utc::now() - handle.connected_at).num_seconds(),
            "WebSocket connection unregistered"
        );

        if went_offline {
            self.broadcast_all(&OutboundMessage::UserStatusChange(StatusChange::offline(
                user_id,
                Utc::now(),
            )));
        }

        went_offline
    }

    /// Hand the route held by `released` to the user's newest remaining
    /// connection, or drop it if none is left. `true` when the user went
    /// offline.
    fn release_route(&self, user_id: UserId, mut released: ConnectionId) -> bool {
        loop {
            let fallback = self
                .pool
                .user_connections(&user_id)
                .into_iter()
                .rev()
                .find(|c| c.is_alive())
                .map(|c| c.id);

            match self.presence.release(user_id, released, fallback) {
                Release::Kept => return false,
                Release::Offline => return true,
                Release::Moved(next) => {
                    // The fallback may have been unregistered meanwhile.
                    if self.pool.get(&next).is_some() {
                        debug!(
                            user_id = %user_id,
                            conn_id = %next,
                            "Presence route moved to remaining connection"
                        );
                        return false;
                    }
                    released = next;
                }
            }
        }
    }

    /// Sends an event to one connection.
    pub fn send_to_connection(&self, handle: &ConnectionHandle, message: &OutboundMessage) -> bool {
        match encode(message) {
            Some(frame) => self.deliver(handle, frame),
            None => false,
        }
    }

    /// Sends an event to the user's presence-routed connection.
    ///
    /// Returns `false` if the user is offline or the frame was not queued.
    pub fn send_to_user(&self, user_id: UserId, message: &OutboundMessage) -> bool {
        let Some(handle) = self
            .presence
            .route(user_id)
            .and_then(|conn_id| self.pool.get(&conn_id))
        else {
            return false;
        };
        self.send_to_connection(&handle, message)
    }

    /// Sends an event to every connection in a room. Returns how many were queued.
    pub fn send_to_room(&self, room: &str, message: &OutboundMessage) -> usize {
        let Some(frame) = encode(message) else {
            return 0;
        };
        self.rooms
            .members(room)
            .iter()
            .filter_map(|conn_id| self.pool.get(conn_id))
            .filter(|handle| self.deliver(handle, frame.clone()))
            .count()
    }

    /// Sends an event to every connection. Returns how many were queued.
    pub fn broadcast_all(&self, message: &OutboundMessage) -> usize {
        let Some(frame) = encode(message) else {
            return 0;
        };
        self.pool
            .all_connections()
            .iter()
            .filter(|handle| self.deliver(handle, frame.clone()))
            .count()
    }

    /// Signals every connection to close. Each socket task then runs its
    /// own cleanup through [`unregister`](Self::unregister).
    pub fn close_all(&self) -> usize {
        let all = self.pool.all_connections();
        for handle in &all {
            handle.close();
        }
        info!(count = all.len(), "Closing all connections");
        all.len()
    }

    /// Whether the user has a presence route.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.presence.is_online(user_id)
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of online users.
    pub fn online_count(&self) -> usize {
        self.presence.online_count()
    }

    fn deliver(&self, handle: &ConnectionHandle, frame: String) -> bool {
        match handle.send(frame) {
            Delivery::Queued => {
                self.metrics.frames_sent(1);
                true
            }
            Delivery::Dropped | Delivery::Closed => {
                self.metrics.frame_dropped();
                false
            }
        }
    }
}

fn encode(message: &OutboundMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(frame) => Some(frame),
        Err(e) => {
            error!(error = %e, "Failed to serialize outbound message");
            None
        }
    }
}
