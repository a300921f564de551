//! # mathquest-database
//!
//! The [`DirectoryStore`] seam between the realtime gateway and persistence,
//! with a PostgreSQL implementation backed by concrete repositories and a
//! process-local implementation for development and tests.

pub mod connection;
pub mod memory;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryDirectoryStore;
pub use postgres::PgDirectoryStore;
pub use store::DirectoryStore;
