//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups that may legitimately
//! miss (enrollment or progress for a given pair) return `Option`;
//! lookups by primary key fail with [`LecternError::NotFound`].
//! Creates that violate a uniqueness constraint fail with
//! [`LecternError::Conflict`].
//!
//! [`LecternError::NotFound`]: crate::error::LecternError::NotFound
//! [`LecternError::Conflict`]: crate::error::LecternError::Conflict

use uuid::Uuid;

use crate::error::LecternResult;
use crate::models::{
    category::{Category, CreateCategory, UpdateCategory},
    course::{Course, CourseFilter, CreateCourse, UpdateCourse},
    enrollment::{CreateEnrollment, Enrollment, EnrollmentStatus},
    lesson::{CreateLesson, Lesson, UpdateLesson},
    progress::{CreateProgress, Progress, UpdateProgress},
    review::{CreateReview, Review, UpdateReview},
    user::{CreateUser, UpdateUser, User, UserRole},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = LecternResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LecternResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = LecternResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = LecternResult<User>> + Send;
    /// Newest first, optionally restricted to one role.
    fn list(
        &self,
        role: Option<UserRole>,
        pagination: Pagination,
    ) -> impl Future<Output = LecternResult<PaginatedResult<User>>> + Send;
    fn count(&self, role: Option<UserRole>) -> impl Future<Output = LecternResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

pub trait CategoryRepository: Send + Sync {
    fn create(
        &self,
        input: CreateCategory,
    ) -> impl Future<Output = LecternResult<Category>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LecternResult<Category>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateCategory,
    ) -> impl Future<Output = LecternResult<Category>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = LecternResult<()>> + Send;
    /// All categories ordered by name.
    fn list(&self) -> impl Future<Output = LecternResult<Vec<Category>>> + Send;
}

pub trait CourseRepository: Send + Sync {
    fn create(&self, input: CreateCourse) -> impl Future<Output = LecternResult<Course>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LecternResult<Course>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateCourse,
    ) -> impl Future<Output = LecternResult<Course>> + Send;
    /// Removes the course together with its lessons, enrollments,
    /// progress rows and reviews.
    fn delete(&self, id: Uuid) -> impl Future<Output = LecternResult<()>> + Send;
    /// Newest first.
    fn list(
        &self,
        filter: CourseFilter,
        pagination: Pagination,
    ) -> impl Future<Output = LecternResult<PaginatedResult<Course>>> + Send;
    /// Every course owned by an instructor, oldest first.
    fn list_by_instructor(
        &self,
        instructor_id: Uuid,
    ) -> impl Future<Output = LecternResult<Vec<Course>>> + Send;
    fn count(&self) -> impl Future<Output = LecternResult<u64>> + Send;
    fn count_by_category(
        &self,
        category_id: Uuid,
    ) -> impl Future<Output = LecternResult<u64>> + Send;
}

pub trait LessonRepository: Send + Sync {
    fn create(&self, input: CreateLesson) -> impl Future<Output = LecternResult<Lesson>> + Send;
    /// Fetch a lesson only if it belongs to `course_id`.
    fn get_in_course(
        &self,
        course_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = LecternResult<Lesson>> + Send;
    fn update(
        &self,
        course_id: Uuid,
        id: Uuid,
        input: UpdateLesson,
    ) -> impl Future<Output = LecternResult<Lesson>> + Send;
    /// Removes the lesson and any progress recorded against it.
    fn delete(&self, course_id: Uuid, id: Uuid) -> impl Future<Output = LecternResult<()>> + Send;
    /// Lessons of a course ordered by `position` ascending.
    fn list_by_course(
        &self,
        course_id: Uuid,
    ) -> impl Future<Output = LecternResult<Vec<Lesson>>> + Send;
    fn count_by_course(&self, course_id: Uuid) -> impl Future<Output = LecternResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Learning records
// ---------------------------------------------------------------------------

pub trait EnrollmentRepository: Send + Sync {
    /// Creates an `Active` enrollment. Fails with `Conflict` if one
    /// already exists for the pair.
    fn create(
        &self,
        input: CreateEnrollment,
    ) -> impl Future<Output = LecternResult<Enrollment>> + Send;
    fn find(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> impl Future<Output = LecternResult<Option<Enrollment>>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = LecternResult<()>> + Send;
    /// Newest enrollment first.
    fn list_by_student(
        &self,
        student_id: Uuid,
    ) -> impl Future<Output = LecternResult<Vec<Enrollment>>> + Send;
    /// Newest enrollment first.
    fn list_by_course(
        &self,
        course_id: Uuid,
    ) -> impl Future<Output = LecternResult<Vec<Enrollment>>> + Send;
    fn count(
        &self,
        status: Option<EnrollmentStatus>,
    ) -> impl Future<Output = LecternResult<u64>> + Send;
}

pub trait ProgressRepository: Send + Sync {
    /// Fails with `Conflict` if a row for the triple already exists.
    fn create(
        &self,
        input: CreateProgress,
    ) -> impl Future<Output = LecternResult<Progress>> + Send;
    fn find(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> impl Future<Output = LecternResult<Option<Progress>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateProgress,
    ) -> impl Future<Output = LecternResult<Progress>> + Send;
    /// All of a student's progress rows within one course.
    fn list_for_student(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> impl Future<Output = LecternResult<Vec<Progress>>> + Send;
}

pub trait ReviewRepository: Send + Sync {
    /// Fails with `Conflict` if the student already reviewed the course.
    fn create(&self, input: CreateReview) -> impl Future<Output = LecternResult<Review>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LecternResult<Review>> + Send;
    fn find(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> impl Future<Output = LecternResult<Option<Review>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateReview,
    ) -> impl Future<Output = LecternResult<Review>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = LecternResult<()>> + Send;
    /// Newest first.
    fn list_by_course(
        &self,
        course_id: Uuid,
    ) -> impl Future<Output = LecternResult<Vec<Review>>> + Send;
}
