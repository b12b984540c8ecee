//! Course analytics for instructors: per-student completion on one
//! course and enrollment counts across everything an instructor teaches.
//!
//! Both reports issue follow-up queries per enrollment.

use chrono::{DateTime, Utc};
use lectern_core::error::{LecternError, LecternResult};
use lectern_core::models::enrollment::EnrollmentStatus;
use lectern_core::models::principal::Principal;
use lectern_core::repository::{
    CourseRepository, EnrollmentRepository, LessonRepository, ProgressRepository, UserRepository,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::guard::{self, Action, Resource};
use crate::progress::completion_percentage;

#[derive(Debug, Clone, Serialize)]
pub struct StudentProgressSummary {
    pub student_id: Uuid,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    pub completed_lessons: u64,
    pub total_lessons: u64,
    pub completion_percentage: f64,
    /// Latest progress update, or the enrollment time if there is none.
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub student_id: Uuid,
    pub name: String,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseEnrollmentAnalytics {
    pub course_id: Uuid,
    pub course_title: String,
    pub total_enrollments: u64,
    pub active_enrollments: u64,
    pub completed_enrollments: u64,
    pub students: Vec<RosterEntry>,
}

pub struct AnalyticsService<C, E, L, P, U>
where
    C: CourseRepository,
    E: EnrollmentRepository,
    L: LessonRepository,
    P: ProgressRepository,
    U: UserRepository,
{
    courses: C,
    enrollments: E,
    lessons: L,
    progress: P,
    users: U,
}

impl<C, E, L, P, U> AnalyticsService<C, E, L, P, U>
where
    C: CourseRepository,
    E: EnrollmentRepository,
    L: LessonRepository,
    P: ProgressRepository,
    U: UserRepository,
{
    pub fn new(courses: C, enrollments: E, lessons: L, progress: P, users: U) -> Self {
        Self {
            courses,
            enrollments,
            lessons,
            progress,
            users,
        }
    }

    /// Completion metrics for every student enrolled in a course.
    ///
    /// A course the principal may not see is reported as missing, so
    /// the roster never confirms that someone else's course exists. The
    /// requester's role is taken from the stored account.
    pub async fn instructor_roster(
        &self,
        course_id: Uuid,
        principal: &Principal,
    ) -> LecternResult<Vec<StudentProgressSummary>> {
        let course = self.courses.get_by_id(course_id).await?;
        let requester = Principal::from(&self.users.get_by_id(principal.user_id).await?);
        let roster = Resource::Roster {
            instructor_id: course.instructor_id,
        };
        if !guard::can_access(&requester, Action::Read, roster) {
            debug!(user_id = %principal.user_id, course_id = %course_id, "Roster hidden");
            return Err(LecternError::not_found("course", course_id));
        }

        let total_lessons = self.lessons.count_by_course(course_id).await?;
        let enrollments = self.enrollments.list_by_course(course_id).await?;

        let mut summaries = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            let rows = self
                .progress
                .list_for_student(enrollment.student_id, course_id)
                .await?;
            let completed_lessons = rows.iter().filter(|p| p.is_completed).count() as u64;
            let last_activity = rows
                .iter()
                .map(|p| p.updated_at)
                .max()
                .unwrap_or(enrollment.enrolled_at);

            summaries.push(StudentProgressSummary {
                student_id: enrollment.student_id,
                status: enrollment.status,
                enrolled_at: enrollment.enrolled_at,
                completed_lessons,
                total_lessons,
                completion_percentage: completion_percentage(completed_lessons, total_lessons),
                last_activity,
            });
        }
        Ok(summaries)
    }

    /// Enrollment counts and rosters for every course the principal
    /// teaches.
    pub async fn instructor_enrollment_analytics(
        &self,
        principal: &Principal,
    ) -> LecternResult<Vec<CourseEnrollmentAnalytics>> {
        let courses = self.courses.list_by_instructor(principal.user_id).await?;

        let mut analytics = Vec::with_capacity(courses.len());
        for course in courses {
            let enrollments = self.enrollments.list_by_course(course.id).await?;
            let count = |status: EnrollmentStatus| {
                enrollments.iter().filter(|e| e.status == status).count() as u64
            };
            let active_enrollments = count(EnrollmentStatus::Active);
            let completed_enrollments = count(EnrollmentStatus::Completed);

            let mut students = Vec::with_capacity(enrollments.len());
            for enrollment in &enrollments {
                let student = self.users.get_by_id(enrollment.student_id).await?;
                students.push(RosterEntry {
                    student_id: student.id,
                    name: student.full_name(),
                    status: enrollment.status,
                    enrolled_at: enrollment.enrolled_at,
                });
            }

            analytics.push(CourseEnrollmentAnalytics {
                course_id: course.id,
                course_title: course.title,
                total_enrollments: enrollments.len() as u64,
                active_enrollments,
                completed_enrollments,
                students,
            });
        }
        Ok(analytics)
    }
}
