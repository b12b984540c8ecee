//! Progress domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-(student, course, lesson) completion state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub lesson_id: Uuid,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Seconds spent on the lesson.
    pub time_spent: u32,
    /// Score in `[0, 100]` for graded lessons.
    pub score: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProgress {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub lesson_id: Uuid,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_spent: Option<u32>,
    pub score: Option<u32>,
}

/// Overwrites completion state. `is_completed` and `completed_at` are
/// always written; `time_spent` and `score` only when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProgress {
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_spent: Option<u32>,
    pub score: Option<u32>,
}
