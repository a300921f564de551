//! User, role, identity, and directory entries.

pub mod directory;
pub mod identity;
pub mod model;
pub mod role;

pub use directory::DirectoryUser;
pub use identity::Identity;
pub use model::User;
pub use role::UserRole;
