//! Progress tracker: per-lesson completion records and the course
//! completion summary derived from them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lectern_core::error::{LecternError, LecternResult};
use lectern_core::models::enrollment::EnrollmentStatus;
use lectern_core::models::lesson::LessonType;
use lectern_core::models::principal::Principal;
use lectern_core::models::progress::{CreateProgress, Progress, UpdateProgress};
use lectern_core::repository::{
    CourseRepository, EnrollmentRepository, LessonRepository, ProgressRepository,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::LearningError;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `completed / total` as a percentage rounded to two decimals; 0 for
/// a course without lessons.
pub fn completion_percentage(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(100.0 * completed as f64 / total as f64)
}

/// What a student reports for one lesson.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub is_completed: bool,
    pub time_spent: Option<u32>,
    pub score: Option<u32>,
}

/// A lesson annotated with the student's progress on it.
#[derive(Debug, Clone, Serialize)]
pub struct LessonProgress {
    pub lesson_id: Uuid,
    pub title: String,
    pub position: u32,
    pub lesson_type: LessonType,
    pub duration: Option<u32>,
    pub is_completed: bool,
    pub time_spent: u32,
    pub score: Option<u32>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    pub course_id: Uuid,
    pub course_title: String,
    pub total_lessons: u64,
    pub completed_lessons: u64,
    pub completion_percentage: f64,
    /// Every lesson of the course, ordered by position.
    pub lessons: Vec<LessonProgress>,
}

/// Progress service.
pub struct ProgressService<P, E, L, C>
where
    P: ProgressRepository,
    E: EnrollmentRepository,
    L: LessonRepository,
    C: CourseRepository,
{
    progress: P,
    enrollments: E,
    lessons: L,
    courses: C,
}

impl<P, E, L, C> ProgressService<P, E, L, C>
where
    P: ProgressRepository,
    E: EnrollmentRepository,
    L: LessonRepository,
    C: CourseRepository,
{
    pub fn new(progress: P, enrollments: E, lessons: L, courses: C) -> Self {
        Self {
            progress,
            enrollments,
            lessons,
            courses,
        }
    }

    /// Record the principal's progress on one lesson.
    ///
    /// Requires an active enrollment and a lesson that belongs to the
    /// course. `completed_at` is stamped when `is_completed` is set and
    /// cleared otherwise, on both the create and the update path.
    pub async fn upsert_progress(
        &self,
        principal: &Principal,
        course_id: Uuid,
        lesson_id: Uuid,
        update: ProgressUpdate,
    ) -> LecternResult<Progress> {
        let enrolled = self
            .enrollments
            .find(principal.user_id, course_id)
            .await?
            .is_some_and(|e| e.status == EnrollmentStatus::Active);
        if !enrolled {
            return Err(LearningError::NotEnrolled.into());
        }

        self.lessons.get_in_course(course_id, lesson_id).await?;

        if update.score.is_some_and(|s| s > 100) {
            return Err(LearningError::Invalid("score must be between 0 and 100".into()).into());
        }

        let completed_at = update.is_completed.then(Utc::now);
        let changes = UpdateProgress {
            is_completed: update.is_completed,
            completed_at,
            time_spent: update.time_spent,
            score: update.score,
        };

        if let Some(existing) = self
            .progress
            .find(principal.user_id, course_id, lesson_id)
            .await?
        {
            return self.progress.update(existing.id, changes).await;
        }

        let created = self
            .progress
            .create(CreateProgress {
                student_id: principal.user_id,
                course_id,
                lesson_id,
                is_completed: update.is_completed,
                completed_at,
                time_spent: update.time_spent,
                score: update.score,
            })
            .await;

        match created {
            Ok(progress) => {
                info!(
                    student_id = %principal.user_id,
                    lesson_id = %lesson_id,
                    completed = progress.is_completed,
                    "Progress recorded"
                );
                Ok(progress)
            }
            Err(LecternError::Conflict { .. }) => {
                debug!(lesson_id = %lesson_id, "Progress create lost race, updating");
                match self
                    .progress
                    .find(principal.user_id, course_id, lesson_id)
                    .await?
                {
                    Some(existing) => self.progress.update(existing.id, changes).await,
                    // The competing write rolled back as well.
                    None => Err(LearningError::ProgressContended.into()),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Completion summary of a course for the principal.
    ///
    /// Any enrollment row grants access, so students who completed or
    /// cancelled still see their history.
    pub async fn course_progress(
        &self,
        principal: &Principal,
        course_id: Uuid,
    ) -> LecternResult<CourseProgress> {
        if self
            .enrollments
            .find(principal.user_id, course_id)
            .await?
            .is_none()
        {
            return Err(LearningError::NotEnrolled.into());
        }

        let course = self.courses.get_by_id(course_id).await?;
        let lessons = self.lessons.list_by_course(course_id).await?;
        let rows = self
            .progress
            .list_for_student(principal.user_id, course_id)
            .await?;

        let completed_lessons = rows.iter().filter(|p| p.is_completed).count() as u64;
        let total_lessons = lessons.len() as u64;
        let by_lesson: HashMap<Uuid, Progress> =
            rows.into_iter().map(|p| (p.lesson_id, p)).collect();

        let lessons = lessons
            .into_iter()
            .map(|lesson| {
                let row = by_lesson.get(&lesson.id);
                LessonProgress {
                    lesson_id: lesson.id,
                    title: lesson.title,
                    position: lesson.position,
                    lesson_type: lesson.lesson_type,
                    duration: lesson.duration,
                    is_completed: row.is_some_and(|p| p.is_completed),
                    time_spent: row.map_or(0, |p| p.time_spent),
                    score: row.and_then(|p| p.score),
                    completed_at: row.and_then(|p| p.completed_at),
                }
            })
            .collect();

        Ok(CourseProgress {
            course_id,
            course_title: course.title,
            total_lessons,
            completed_lessons,
            completion_percentage: completion_percentage(completed_lessons, total_lessons),
            lessons,
        })
    }
}
