//! Admin console: platform statistics and user management.

use lectern_core::error::LecternResult;
use lectern_core::models::enrollment::EnrollmentStatus;
use lectern_core::models::principal::Principal;
use lectern_core::models::user::{UpdateUser, User, UserRole, UserStatus};
use lectern_core::repository::{CourseRepository, EnrollmentRepository, UserRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::LearningConfig;
use crate::guard::{self, Action, Resource};
use crate::paging::{Page, PageRequest};
use crate::progress::completion_percentage;

#[derive(Debug, Clone, Serialize)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_students: u64,
    pub total_instructors: u64,
    pub total_courses: u64,
    pub total_enrollments: u64,
    pub active_enrollments: u64,
    /// Share of enrollments that are still active, in percent.
    pub completion_rate: f64,
}

pub struct AdminService<U, C, E>
where
    U: UserRepository,
    C: CourseRepository,
    E: EnrollmentRepository,
{
    users: U,
    courses: C,
    enrollments: E,
    config: LearningConfig,
}

impl<U, C, E> AdminService<U, C, E>
where
    U: UserRepository,
    C: CourseRepository,
    E: EnrollmentRepository,
{
    pub fn new(users: U, courses: C, enrollments: E, config: LearningConfig) -> Self {
        Self {
            users,
            courses,
            enrollments,
            config,
        }
    }

    pub async fn stats(&self, principal: &Principal) -> LecternResult<PlatformStats> {
        guard::authorize(principal, Action::Read, Resource::AdminConsole)?;

        let total_enrollments = self.enrollments.count(None).await?;
        let active_enrollments = self
            .enrollments
            .count(Some(EnrollmentStatus::Active))
            .await?;

        Ok(PlatformStats {
            total_users: self.users.count(None).await?,
            total_students: self.users.count(Some(UserRole::Student)).await?,
            total_instructors: self.users.count(Some(UserRole::Instructor)).await?,
            total_courses: self.courses.count().await?,
            total_enrollments,
            active_enrollments,
            completion_rate: completion_percentage(active_enrollments, total_enrollments),
        })
    }

    /// Users newest first, optionally restricted to one role.
    pub async fn list_users(
        &self,
        principal: &Principal,
        role: Option<UserRole>,
        request: PageRequest,
    ) -> LecternResult<Page<User>> {
        guard::authorize(principal, Action::Read, Resource::AdminConsole)?;

        let (page, limit, pagination) = request.to_pagination(&self.config);
        let result = self.users.list(role, pagination).await?;
        Ok(Page::from_result(result, page, limit))
    }

    pub async fn update_user_status(
        &self,
        principal: &Principal,
        user_id: Uuid,
        status: UserStatus,
    ) -> LecternResult<User> {
        guard::authorize(principal, Action::Update, Resource::AdminConsole)?;
        self.users.get_by_id(user_id).await?;

        let user = self
            .users
            .update(
                user_id,
                UpdateUser {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            user_id = %user_id,
            status = %status.as_str(),
            changed_by = %principal.user_id,
            "User status updated"
        );
        Ok(user)
    }
}
