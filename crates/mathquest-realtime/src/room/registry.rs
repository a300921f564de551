//! Room registry with a reverse index for disconnect cleanup.

use std::collections::HashSet;

use dashmap::DashMap;

use mathquest_core::types::{ConnectionId, UserId};

/// Name of the room every connection of `user_id` joins on connect.
pub fn personal_room(user_id: UserId) -> String {
    format!("user:{user_id}")
}

/// Registry of rooms and the connections in them.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name → member connections.
    rooms: DashMap<String, HashSet<ConnectionId>>,
    /// Connection → rooms it joined.
    memberships: DashMap<ConnectionId, HashSet<String>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room, creating the room on first join.
    pub fn join(&self, room: String, conn_id: ConnectionId) {
        self.rooms.entry(room.clone()).or_default().insert(conn_id);
        self.memberships.entry(conn_id).or_default().insert(room);
    }

    /// Remove a connection from every room it joined. Empty rooms are dropped.
    pub fn leave_all(&self, conn_id: ConnectionId) -> HashSet<String> {
        let joined = self
            .memberships
            .remove(&conn_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default();

        for room in &joined {
            if let Some(mut members) = self.rooms.get_mut(room) {
                members.remove(&conn_id);
            }
            self.rooms.remove_if(room, |_, members| members.is_empty());
        }

        joined
    }

    /// Connections currently in `room`.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
