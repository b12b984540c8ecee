//! Enrollment manager: students joining and leaving courses, and the
//! two joined enrollment listings.

use chrono::{DateTime, Utc};
use lectern_core::error::{LecternError, LecternResult};
use lectern_core::models::course::Course;
use lectern_core::models::enrollment::{CreateEnrollment, Enrollment, EnrollmentStatus};
use lectern_core::models::principal::Principal;
use lectern_core::repository::{CourseRepository, EnrollmentRepository, UserRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{LearningError, on_conflict};
use crate::guard::{self, Action, Resource};

/// One of a student's enrollments with the course it refers to.
#[derive(Debug, Clone, Serialize)]
pub struct StudentEnrollment {
    pub enrollment: Enrollment,
    pub course: Course,
    pub instructor_name: String,
}

/// One enrollment on a course with the enrolled student's contact data.
#[derive(Debug, Clone, Serialize)]
pub struct CourseEnrollment {
    pub enrollment_id: Uuid,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub student_id: Uuid,
    pub student_name: String,
    pub student_email: String,
}

/// Enrollment service.
///
/// Generic over repository implementations so that it has no
/// dependency on the database crate.
pub struct EnrollmentService<E: EnrollmentRepository, C: CourseRepository, U: UserRepository> {
    enrollments: E,
    courses: C,
    users: U,
}

impl<E, C, U> EnrollmentService<E, C, U>
where
    E: EnrollmentRepository,
    C: CourseRepository,
    U: UserRepository,
{
    pub fn new(enrollments: E, courses: C, users: U) -> Self {
        Self {
            enrollments,
            courses,
            users,
        }
    }

    /// Enroll the principal in a published course.
    ///
    /// Any existing enrollment for the pair blocks a new one, whatever
    /// its status. Two concurrent calls for the same pair resolve to one
    /// success and one `Conflict` through the store's unique index.
    pub async fn enroll(&self, principal: &Principal, course_id: Uuid) -> LecternResult<Enrollment> {
        let course = self.courses.get_by_id(course_id).await?;
        if !course.is_published() {
            return Err(LearningError::CourseNotPublished.into());
        }

        if self
            .enrollments
            .find(principal.user_id, course_id)
            .await?
            .is_some()
        {
            return Err(LearningError::AlreadyEnrolled.into());
        }

        let enrollment = self
            .enrollments
            .create(CreateEnrollment {
                student_id: principal.user_id,
                course_id,
            })
            .await
            .map_err(|e| on_conflict(e, LearningError::AlreadyEnrolled))?;

        info!(
            student_id = %principal.user_id,
            course_id = %course_id,
            enrollment_id = %enrollment.id,
            "Student enrolled"
        );
        Ok(enrollment)
    }

    /// Remove the principal's enrollment. The row is deleted outright,
    /// so the student may enroll again later.
    pub async fn unenroll(&self, principal: &Principal, course_id: Uuid) -> LecternResult<()> {
        let enrollment = self
            .enrollments
            .find(principal.user_id, course_id)
            .await?
            .ok_or_else(|| {
                LecternError::not_found("enrollment", format!("{}/{}", principal.user_id, course_id))
            })?;

        self.enrollments.delete(enrollment.id).await?;
        info!(
            student_id = %principal.user_id,
            course_id = %course_id,
            "Student unenrolled"
        );
        Ok(())
    }

    /// The principal's enrollments, newest first, each with its course
    /// and the instructor's display name.
    pub async fn list_for_student(
        &self,
        principal: &Principal,
    ) -> LecternResult<Vec<StudentEnrollment>> {
        let enrollments = self.enrollments.list_by_student(principal.user_id).await?;

        let mut listing = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            let course = self.courses.get_by_id(enrollment.course_id).await?;
            let instructor = self.users.get_by_id(course.instructor_id).await?;
            listing.push(StudentEnrollment {
                enrollment,
                course,
                instructor_name: instructor.full_name(),
            });
        }
        Ok(listing)
    }

    /// Students enrolled in a course, newest enrollment first.
    ///
    /// Visible to the course's instructor and to admins. The requester's
    /// role is taken from the stored account rather than the principal.
    pub async fn list_students_for_course(
        &self,
        course_id: Uuid,
        principal: &Principal,
    ) -> LecternResult<Vec<CourseEnrollment>> {
        let course = self.courses.get_by_id(course_id).await?;
        let requester = self.users.get_by_id(principal.user_id).await?;

        guard::authorize(
            &Principal::from(&requester),
            Action::Read,
            Resource::Roster {
                instructor_id: course.instructor_id,
            },
        )?;

        let enrollments = self.enrollments.list_by_course(course_id).await?;
        let mut students = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            let student = self.users.get_by_id(enrollment.student_id).await?;
            students.push(CourseEnrollment {
                enrollment_id: enrollment.id,
                status: enrollment.status,
                enrolled_at: enrollment.enrolled_at,
                completed_at: enrollment.completed_at,
                student_id: student.id,
                student_name: student.full_name(),
                student_email: student.email,
            });
        }
        Ok(students)
    }
}
