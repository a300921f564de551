//! WebSocket connection lifecycle: authentication, handles, the pool, and
//! the manager that ties them to presence and rooms.

pub mod authenticator;
pub mod handle;
pub mod manager;
pub mod pool;

pub use authenticator::WsAuthenticator;
pub use handle::ConnectionHandle;
pub use manager::ConnectionManager;
pub use pool::ConnectionPool;
