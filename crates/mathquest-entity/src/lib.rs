//! # mathquest-entity
//!
//! Domain entity models for Math Quest. Row types derive `sqlx::FromRow`;
//! wire types derive `serde` with the camelCase field names the web client
//! expects.

pub mod message;
pub mod user;

pub use message::{ChatMessage, Message, NewMessage};
pub use user::{DirectoryUser, Identity, User, UserRole};
