//! Server-initiated pushes used by REST flows: targeted events, progress
//! updates, and system chat messages.

pub mod dispatcher;
pub mod events;

pub use dispatcher::NotificationDispatcher;
pub use events::{LessonReviewed, LessonSubmitted, ReviewRequested};
