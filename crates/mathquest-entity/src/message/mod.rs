//! Chat message records and their wire format.

pub mod chat;
pub mod model;

pub use chat::ChatMessage;
pub use model::{Message, NewMessage};
