//! # mathquest-realtime
//!
//! Realtime gateway for Math Quest. Provides:
//!
//! - Handshake authentication of WebSocket connections with a bounded timeout
//! - A single-route presence registry (`userId -> connectionId`)
//! - Personal rooms (`user:<id>`) for multi-device pushes
//! - Directory, history, send-message, and unread-summary handlers
//! - Targeted notifications and system chat messages for REST flows
//! - Gateway counters for the health endpoint

pub mod chat;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod presence;
pub mod room;
pub mod server;

pub use chat::handler::ChatHandler;
pub use connection::handle::ConnectionHandle;
pub use connection::manager::ConnectionManager;
pub use message::types::{InboundMessage, OutboundMessage};
pub use notification::dispatcher::NotificationDispatcher;
pub use presence::registry::PresenceRegistry;
pub use room::registry::RoomRegistry;
pub use server::RealtimeGateway;
