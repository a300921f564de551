//! PostgreSQL repositories for the tables the realtime gateway reads and writes.

pub mod message;
pub mod token_blacklist;
pub mod user;

pub use message::MessageRepository;
pub use token_blacklist::TokenBlacklistRepository;
pub use user::UserRepository;
