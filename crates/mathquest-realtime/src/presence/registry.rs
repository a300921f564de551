//! Single-route presence registry.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use mathquest_core::types::{ConnectionId, UserId};

/// Outcome of [`PresenceRegistry::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// The route named another connection and was left alone.
    Kept,
    /// The route moved to the given remaining connection.
    Moved(ConnectionId),
    /// The route was removed; the user is offline.
    Offline,
}

/// Maps each online user to the connection that chat delivery targets.
///
/// A user who connects twice is routed to the newest connection. Every
/// operation is one synchronous map call, so it can never interleave with
/// another operation on the same user halfway through.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    routes: DashMap<UserId, ConnectionId>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `user_id` to `conn_id`, returning the connection it replaced.
    pub fn register(&self, user_id: UserId, conn_id: ConnectionId) -> Option<ConnectionId> {
        self.routes.insert(user_id, conn_id)
    }

    /// Release the route held by `conn_id`.
    ///
    /// Only acts if the route still names `conn_id`. The route then moves to
    /// `fallback` when one is given, otherwise it is removed.
    pub fn release(
        &self,
        user_id: UserId,
        conn_id: ConnectionId,
        fallback: Option<ConnectionId>,
    ) -> Release {
        match self.routes.entry(user_id) {
            Entry::Occupied(mut entry) if *entry.get() == conn_id => match fallback {
                Some(next) => {
                    entry.insert(next);
                    Release::Moved(next)
                }
                None => {
                    entry.remove();
                    Release::Offline
                }
            },
            _ => Release::Kept,
        }
    }

    /// Whether the user has a routed connection.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.routes.contains_key(&user_id)
    }

    /// The connection chat delivery for `user_id` targets.
    pub fn route(&self, user_id: UserId) -> Option<ConnectionId> {
        self.routes.get(&user_id).map(|entry| *entry.value())
    }

    /// All online users.
    pub fn all(&self) -> Vec<UserId> {
        self.routes.iter().map(|entry| *entry.key()).collect()
    }

    /// Number of online users.
    pub fn online_count(&self) -> usize {
        self.routes.len()
    }
}
