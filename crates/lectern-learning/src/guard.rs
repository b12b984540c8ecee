//! Authorization guard.
//!
//! A pure decision function over `(principal, action, resource)`. The
//! services resolve the resource (and its owner) from the store first,
//! then ask the guard before writing anything.

use std::fmt;

use lectern_core::error::LecternResult;
use lectern_core::models::principal::Principal;
use uuid::Uuid;

use crate::error::LearningError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// The thing being acted on, carrying whatever ownership fact the
/// decision needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// An enrollment row belonging to `student_id`.
    Enrollment { student_id: Uuid },
    /// A course taught by `instructor_id`.
    Course { instructor_id: Uuid },
    /// A lesson inside a course taught by `instructor_id`.
    Lesson { instructor_id: Uuid },
    /// The enrolled-students view of a course taught by `instructor_id`.
    Roster { instructor_id: Uuid },
    /// A review written by `student_id`.
    Review { student_id: Uuid },
    Category,
    AdminConsole,
}

fn owns_course(principal: &Principal, instructor_id: Uuid) -> bool {
    principal.user_id == instructor_id || principal.is_admin()
}

/// Decide whether `principal` may perform `action` on `resource`.
pub fn can_access(principal: &Principal, action: Action, resource: Resource) -> bool {
    match (resource, action) {
        (Resource::Enrollment { student_id }, _) => principal.user_id == student_id,

        (Resource::Course { instructor_id }, Action::Create) => {
            principal.role.can_teach() && owns_course(principal, instructor_id)
        }
        (Resource::Course { .. } | Resource::Lesson { .. }, Action::Read) => true,
        (Resource::Course { instructor_id } | Resource::Lesson { instructor_id }, _) => {
            owns_course(principal, instructor_id)
        }

        (Resource::Roster { instructor_id }, _) => owns_course(principal, instructor_id),

        (Resource::Review { .. }, Action::Read | Action::Create) => true,
        (Resource::Review { student_id }, Action::Update) => principal.user_id == student_id,
        (Resource::Review { student_id }, Action::Delete) => {
            principal.user_id == student_id || principal.is_admin()
        }

        (Resource::Category, Action::Read) => true,
        (Resource::Category, _) | (Resource::AdminConsole, _) => principal.is_admin(),
    }
}

fn denial(action: Action, resource: Resource) -> LearningError {
    match resource {
        Resource::Enrollment { .. } => LearningError::NotEnrollmentOwner,
        Resource::Course { .. } if action == Action::Create => LearningError::InstructorRequired,
        Resource::Course { .. } | Resource::Lesson { .. } | Resource::Roster { .. } => {
            LearningError::NotCourseOwner
        }
        Resource::Review { .. } => LearningError::NotReviewAuthor,
        Resource::Category | Resource::AdminConsole => LearningError::AdminRequired,
    }
}

/// [`can_access`] as a fallible check yielding `AuthorizationDenied`.
pub fn authorize(principal: &Principal, action: Action, resource: Resource) -> LecternResult<()> {
    if can_access(principal, action, resource) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %principal.user_id,
            role = %principal.role,
            %action,
            ?resource,
            "Access denied"
        );
        Err(denial(action, resource).into())
    }
}
