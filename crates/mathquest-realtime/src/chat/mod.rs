//! Directory, history, send-message, and unread-summary handling.

pub mod handler;

pub use handler::ChatHandler;
