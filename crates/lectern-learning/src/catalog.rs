//! Catalog: courses, their lessons, and categories.

use lectern_core::error::LecternResult;
use lectern_core::models::category::{Category, CreateCategory, UpdateCategory};
use lectern_core::models::course::{Course, CourseFilter, CourseStatus, CreateCourse, UpdateCourse};
use lectern_core::models::lesson::{CreateLesson, Lesson, LessonType, UpdateLesson};
use lectern_core::models::principal::Principal;
use lectern_core::repository::{
    CategoryRepository, CourseRepository, LessonRepository, UserRepository,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::LearningConfig;
use crate::error::LearningError;
use crate::guard::{self, Action, Resource};
use crate::paging::{Page, PageRequest};

/// Input for creating a course. The instructor is always the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Defaults to [`CourseStatus::Draft`].
    pub status: Option<CourseStatus>,
    pub level: Option<String>,
    pub language: Option<String>,
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLesson {
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub position: u32,
    pub lesson_type: LessonType,
    pub duration: Option<u32>,
    pub video_url: Option<String>,
}

/// A course with display names resolved and, on request, its lessons.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    pub course: Course,
    pub instructor_name: String,
    pub category_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessons: Option<Vec<Lesson>>,
}

fn check_price(price: f64) -> Result<(), LearningError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(LearningError::Invalid(format!(
            "price must be a non-negative number, got {price}"
        )))
    }
}

pub struct CatalogService<C, L, G, U>
where
    C: CourseRepository,
    L: LessonRepository,
    G: CategoryRepository,
    U: UserRepository,
{
    courses: C,
    lessons: L,
    categories: G,
    users: U,
    config: LearningConfig,
}

impl<C, L, G, U> CatalogService<C, L, G, U>
where
    C: CourseRepository,
    L: LessonRepository,
    G: CategoryRepository,
    U: UserRepository,
{
    pub fn new(courses: C, lessons: L, categories: G, users: U, config: LearningConfig) -> Self {
        Self {
            courses,
            lessons,
            categories,
            users,
            config,
        }
    }

    // -- Courses ----------------------------------------------------------

    /// Filtered course listing, newest first.
    pub async fn list_courses(
        &self,
        filter: CourseFilter,
        request: PageRequest,
    ) -> LecternResult<Page<Course>> {
        let (page, limit, pagination) = request.to_pagination(&self.config);
        let result = self.courses.list(filter, pagination).await?;
        Ok(Page::from_result(result, page, limit))
    }

    pub async fn get_course(&self, id: Uuid, include_lessons: bool) -> LecternResult<CourseDetail> {
        let course = self.courses.get_by_id(id).await?;
        let instructor = self.users.get_by_id(course.instructor_id).await?;
        let category = self.categories.get_by_id(course.category_id).await?;
        let lessons = if include_lessons {
            Some(self.lessons.list_by_course(id).await?)
        } else {
            None
        };

        Ok(CourseDetail {
            course,
            instructor_name: instructor.full_name(),
            category_name: category.name,
            lessons,
        })
    }

    pub async fn create_course(
        &self,
        principal: &Principal,
        input: NewCourse,
    ) -> LecternResult<Course> {
        guard::authorize(
            principal,
            Action::Create,
            Resource::Course {
                instructor_id: principal.user_id,
            },
        )?;
        check_price(input.price)?;
        self.categories.get_by_id(input.category_id).await?;

        let course = self
            .courses
            .create(CreateCourse {
                instructor_id: principal.user_id,
                category_id: input.category_id,
                title: input.title,
                description: input.description,
                price: input.price,
                status: input.status.unwrap_or_default(),
                level: input.level,
                language: input.language,
                duration: input.duration,
            })
            .await?;

        info!(course_id = %course.id, instructor_id = %principal.user_id, "Course created");
        Ok(course)
    }

    pub async fn update_course(
        &self,
        principal: &Principal,
        id: Uuid,
        changes: UpdateCourse,
    ) -> LecternResult<Course> {
        let course = self.courses.get_by_id(id).await?;
        guard::authorize(
            principal,
            Action::Update,
            Resource::Course {
                instructor_id: course.instructor_id,
            },
        )?;
        if let Some(price) = changes.price {
            check_price(price)?;
        }
        if let Some(category_id) = changes.category_id {
            self.categories.get_by_id(category_id).await?;
        }

        let updated = self.courses.update(id, changes).await?;
        info!(course_id = %id, status = %updated.status.as_str(), "Course updated");
        Ok(updated)
    }

    /// Delete a course with its lessons, enrollments, progress and
    /// reviews.
    pub async fn delete_course(&self, principal: &Principal, id: Uuid) -> LecternResult<()> {
        let course = self.courses.get_by_id(id).await?;
        guard::authorize(
            principal,
            Action::Delete,
            Resource::Course {
                instructor_id: course.instructor_id,
            },
        )?;

        self.courses.delete(id).await?;
        info!(course_id = %id, "Course deleted");
        Ok(())
    }

    // -- Lessons ----------------------------------------------------------

    /// Lessons of a course ordered by position.
    pub async fn list_lessons(&self, course_id: Uuid) -> LecternResult<Vec<Lesson>> {
        self.courses.get_by_id(course_id).await?;
        self.lessons.list_by_course(course_id).await
    }

    pub async fn add_lesson(
        &self,
        principal: &Principal,
        course_id: Uuid,
        input: NewLesson,
    ) -> LecternResult<Lesson> {
        let course = self.courses.get_by_id(course_id).await?;
        guard::authorize(
            principal,
            Action::Create,
            Resource::Lesson {
                instructor_id: course.instructor_id,
            },
        )?;

        let lesson = self
            .lessons
            .create(CreateLesson {
                course_id,
                title: input.title,
                description: input.description,
                content: input.content,
                position: input.position,
                lesson_type: input.lesson_type,
                duration: input.duration,
                video_url: input.video_url,
            })
            .await?;

        info!(lesson_id = %lesson.id, course_id = %course_id, position = lesson.position, "Lesson added");
        Ok(lesson)
    }

    pub async fn update_lesson(
        &self,
        principal: &Principal,
        course_id: Uuid,
        lesson_id: Uuid,
        changes: UpdateLesson,
    ) -> LecternResult<Lesson> {
        self.lessons.get_in_course(course_id, lesson_id).await?;
        let course = self.courses.get_by_id(course_id).await?;
        guard::authorize(
            principal,
            Action::Update,
            Resource::Lesson {
                instructor_id: course.instructor_id,
            },
        )?;

        self.lessons.update(course_id, lesson_id, changes).await
    }

    pub async fn delete_lesson(
        &self,
        principal: &Principal,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> LecternResult<()> {
        self.lessons.get_in_course(course_id, lesson_id).await?;
        let course = self.courses.get_by_id(course_id).await?;
        guard::authorize(
            principal,
            Action::Delete,
            Resource::Lesson {
                instructor_id: course.instructor_id,
            },
        )?;

        self.lessons.delete(course_id, lesson_id).await?;
        info!(lesson_id = %lesson_id, course_id = %course_id, "Lesson deleted");
        Ok(())
    }

    // -- Categories -------------------------------------------------------

    pub async fn list_categories(&self) -> LecternResult<Vec<Category>> {
        self.categories.list().await
    }

    pub async fn get_category(&self, id: Uuid) -> LecternResult<Category> {
        self.categories.get_by_id(id).await
    }

    pub async fn create_category(
        &self,
        principal: &Principal,
        input: CreateCategory,
    ) -> LecternResult<Category> {
        guard::authorize(principal, Action::Create, Resource::Category)?;
        let category = self.categories.create(input).await?;
        info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        principal: &Principal,
        id: Uuid,
        changes: UpdateCategory,
    ) -> LecternResult<Category> {
        guard::authorize(principal, Action::Update, Resource::Category)?;
        self.categories.get_by_id(id).await?;
        self.categories.update(id, changes).await
    }

    pub async fn delete_category(&self, principal: &Principal, id: Uuid) -> LecternResult<()> {
        guard::authorize(principal, Action::Delete, Resource::Category)?;
        self.categories.get_by_id(id).await?;

        let courses = self.courses.count_by_category(id).await?;
        if courses > 0 {
            return Err(LearningError::CategoryInUse { courses }.into());
        }

        self.categories.delete(id).await?;
        info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
