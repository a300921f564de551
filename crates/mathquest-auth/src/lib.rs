//! # mathquest-auth
//!
//! Verification of the access tokens the REST API issues, so the realtime
//! gateway can authenticate a WebSocket handshake.
//!
//! ## Modules
//!
//! - `jwt`: claims layout, HS256 decoding and encoding
//! - `blocklist`: revoked-token lookups (PostgreSQL or in-memory)
//! - `verifier`: the `TokenVerifier` seam the gateway depends on

pub mod blocklist;
pub mod jwt;
pub mod verifier;

pub use blocklist::{MemoryTokenBlocklist, TokenBlocklist};
pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenType};
pub use verifier::TokenVerifier;
