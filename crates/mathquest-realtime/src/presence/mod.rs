//! Presence: which users currently own an authenticated connection.

pub mod registry;

pub use registry::PresenceRegistry;
