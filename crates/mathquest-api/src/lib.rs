//! # mathquest-api
//!
//! HTTP layer for the Math Quest realtime service built on Axum.
//!
//! Provides the `/ws` upgrade (authenticated at the handshake), the health
//! endpoint, CORS and tracing middleware, and `AppError` to HTTP mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
