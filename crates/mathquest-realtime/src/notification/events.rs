//! Lesson workflow event payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `student_submitted_lesson`, sent to the teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSubmitted {
    /// Text shown in the notification.
    pub message: String,
    /// Submitted lesson.
    pub lesson_id: String,
    /// Learning goal the lesson belongs to.
    pub goal_id: String,
    /// Who submitted it.
    pub student_name: String,
    /// Submission time.
    pub timestamp: DateTime<Utc>,
}

/// `teacher_reviewed_lesson`, sent to the student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonReviewed {
    /// Text shown in the notification.
    pub message: String,
    /// Reviewed lesson.
    pub lesson_id: String,
    /// Learning goal the lesson belongs to.
    pub goal_id: String,
    /// Reviewer.
    pub teacher_name: String,
    /// Review time.
    pub timestamp: DateTime<Utc>,
    /// Whether the approved story chapter has an illustration.
    pub has_image: bool,
}

/// `student_requested_review`, sent to the teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequested {
    /// Text shown in the notification.
    pub message: String,
    /// Learning goal to review.
    pub goal_id: String,
}
