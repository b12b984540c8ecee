//! Learning-domain error types.

use lectern_core::error::LecternError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LearningError {
    #[error("course is not available for enrollment")]
    CourseNotPublished,

    #[error("already enrolled in this course")]
    AlreadyEnrolled,

    #[error("you must be enrolled in this course")]
    NotEnrolled,

    #[error("you can only manage your own enrollments")]
    NotEnrollmentOwner,

    #[error("you can only manage your own courses")]
    NotCourseOwner,

    #[error("you can only modify your own reviews")]
    NotReviewAuthor,

    #[error("you have already reviewed this course")]
    AlreadyReviewed,

    #[error("progress for this lesson is being written concurrently, retry")]
    ProgressContended,

    #[error("category is still used by {courses} course(s)")]
    CategoryInUse { courses: u64 },

    #[error("instructor or admin role required")]
    InstructorRequired,

    #[error("admin role required")]
    AdminRequired,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is not active")]
    AccountNotActive,

    #[error("{0}")]
    Invalid(String),

    #[error("password hash error: {0}")]
    PasswordHash(String),
}

impl From<LearningError> for LecternError {
    fn from(err: LearningError) -> Self {
        match err {
            LearningError::CourseNotPublished
            | LearningError::AlreadyEnrolled
            | LearningError::AlreadyReviewed
            | LearningError::ProgressContended
            | LearningError::CategoryInUse { .. } => LecternError::Conflict {
                reason: err.to_string(),
            },
            LearningError::NotEnrolled
            | LearningError::NotEnrollmentOwner
            | LearningError::NotCourseOwner
            | LearningError::NotReviewAuthor
            | LearningError::InstructorRequired
            | LearningError::AdminRequired => LecternError::AuthorizationDenied {
                reason: err.to_string(),
            },
            LearningError::InvalidCredentials | LearningError::AccountNotActive => {
                LecternError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            LearningError::Invalid(message) => LecternError::Validation { message },
            LearningError::PasswordHash(msg) => LecternError::Internal(msg),
        }
    }
}

/// Replace a store-level uniqueness conflict with a domain error.
pub(crate) fn on_conflict(err: LecternError, replacement: LearningError) -> LecternError {
    match err {
        LecternError::Conflict { .. } => replacement.into(),
        other => other,
    }
}
