//! Named groups of connections addressed together.

pub mod registry;

pub use registry::{RoomRegistry, personal_room};
