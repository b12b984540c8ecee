//! SurrealDB implementation of [`LessonRepository`].
//!
//! Every lookup by id is scoped to the owning course, so a lesson id
//! paired with the wrong course behaves exactly like a missing lesson.

use chrono::{DateTime, Utc};
use lectern_core::error::LecternResult;
use lectern_core::models::lesson::{CreateLesson, Lesson, UpdateLesson};
use lectern_core::repository::LessonRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::support::{CountRow, first_count, parse_enum, parse_uuid, single};
use crate::error::DbError;

const SELECT_LESSON_IN_COURSE: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('lesson', $id) WHERE course_id = $course_id";

#[derive(Debug, SurrealValue)]
struct LessonRow {
    record_id: String,
    course_id: String,
    title: String,
    description: Option<String>,
    content: String,
    position: u32,
    lesson_type: String,
    duration: Option<u32>,
    video_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LessonRow {
    fn try_into_lesson(self) -> Result<Lesson, DbError> {
        Ok(Lesson {
            id: parse_uuid("lesson", &self.record_id)?,
            course_id: parse_uuid("course", &self.course_id)?,
            title: self.title,
            description: self.description,
            content: self.content,
            position: self.position,
            lesson_type: parse_enum(&self.lesson_type)?,
            duration: self.duration,
            video_url: self.video_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Lesson repository.
#[derive(Clone)]
pub struct SurrealLessonRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLessonRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LessonRepository for SurrealLessonRepository<C> {
    async fn create(&self, input: CreateLesson) -> LecternResult<Lesson> {
        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(format!(
                "CREATE type::record('lesson', $id) SET \
                 course_id = $course_id, title = $title, \
                 description = $description, content = $content, \
                 position = $position, lesson_type = $lesson_type, \
                 duration = $duration, video_url = $video_url; \
                 {SELECT_LESSON_IN_COURSE};"
            ))
            .bind(("id", id_str.clone()))
            .bind(("course_id", input.course_id.to_string()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("content", input.content))
            .bind(("position", input.position))
            .bind(("lesson_type", input.lesson_type.as_str().to_string()))
            .bind(("duration", input.duration))
            .bind(("video_url", input.video_url))
            .await
            .map_err(|e| DbError::statement("lesson", e))?
            .check()
            .map_err(|e| DbError::statement("lesson", e))?;

        let rows: Vec<LessonRow> = result.take(1).map_err(DbError::from)?;
        let lesson = single(rows, "lesson", id_str)?.try_into_lesson()?;
        debug!(lesson_id = %lesson.id, course_id = %lesson.course_id, "Lesson created");
        Ok(lesson)
    }

    async fn get_in_course(&self, course_id: Uuid, id: Uuid) -> LecternResult<Lesson> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_LESSON_IN_COURSE)
            .bind(("id", id_str.clone()))
            .bind(("course_id", course_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LessonRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, "lesson", id_str)?.try_into_lesson()?)
    }

    async fn update(&self, course_id: Uuid, id: Uuid, input: UpdateLesson) -> LecternResult<Lesson> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.content.is_some() {
            sets.push("content = $content");
        }
        if input.position.is_some() {
            sets.push("position = $position");
        }
        if input.lesson_type.is_some() {
            sets.push("lesson_type = $lesson_type");
        }
        if input.duration.is_some() {
            sets.push("duration = $duration");
        }
        if input.video_url.is_some() {
            sets.push("video_url = $video_url");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('lesson', $id) SET {} WHERE course_id = $course_id; \
             {SELECT_LESSON_IN_COURSE};",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("course_id", course_id.to_string()));
        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(content) = input.content {
            builder = builder.bind(("content", content));
        }
        if let Some(position) = input.position {
            builder = builder.bind(("position", position));
        }
        if let Some(lesson_type) = input.lesson_type {
            builder = builder.bind(("lesson_type", lesson_type.as_str().to_string()));
        }
        if let Some(duration) = input.duration {
            builder = builder.bind(("duration", duration));
        }
        if let Some(video_url) = input.video_url {
            builder = builder.bind(("video_url", video_url));
        }

        let mut result = builder
            .await
            .map_err(|e| DbError::statement("lesson", e))?
            .check()
            .map_err(|e| DbError::statement("lesson", e))?;

        let rows: Vec<LessonRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, "lesson", id_str)?.try_into_lesson()?)
    }

    async fn delete(&self, course_id: Uuid, id: Uuid) -> LecternResult<()> {
        // A lesson outside `course_id` reports NotFound.
        self.get_in_course(course_id, id).await?;
        let id_str = id.to_string();

        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE progress WHERE lesson_id = $id; \
                 DELETE type::record('lesson', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("lesson", e))?;

        debug!(lesson_id = %id_str, course_id = %course_id, "Lesson deleted");
        Ok(())
    }

    async fn list_by_course(&self, course_id: Uuid) -> LecternResult<Vec<Lesson>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM lesson \
                 WHERE course_id = $course_id \
                 ORDER BY position ASC",
            )
            .bind(("course_id", course_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LessonRow> = result.take(0).map_err(DbError::from)?;
        let lessons = rows
            .into_iter()
            .map(|row| row.try_into_lesson())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(lessons)
    }

    async fn count_by_course(&self, course_id: Uuid) -> LecternResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM lesson \
                 WHERE course_id = $course_id GROUP ALL",
            )
            .bind(("course_id", course_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_count(rows))
    }
}
