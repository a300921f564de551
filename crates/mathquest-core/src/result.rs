//! Convenience result type alias for Math Quest.

use crate::error::AppError;

/// A specialized `Result` type for Math Quest operations.
pub type AppResult<T> = Result<T, AppError>;
