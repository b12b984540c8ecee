//! SurrealDB implementation of [`ProgressRepository`].

use chrono::{DateTime, Utc};
use lectern_core::error::LecternResult;
use lectern_core::models::progress::{CreateProgress, Progress, UpdateProgress};
use lectern_core::repository::ProgressRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::support::{parse_uuid, single};
use crate::error::DbError;

const SELECT_PROGRESS: &str =
    "SELECT meta::id(id) AS record_id, * FROM type::record('progress', $id)";

#[derive(Debug, SurrealValue)]
struct ProgressRow {
    record_id: String,
    student_id: String,
    course_id: String,
    lesson_id: String,
    is_completed: bool,
    completed_at: Option<DateTime<Utc>>,
    time_spent: u32,
    score: Option<u32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProgressRow {
    fn try_into_progress(self) -> Result<Progress, DbError> {
        Ok(Progress {
            id: parse_uuid("progress", &self.record_id)?,
            student_id: parse_uuid("student", &self.student_id)?,
            course_id: parse_uuid("course", &self.course_id)?,
            lesson_id: parse_uuid("lesson", &self.lesson_id)?,
            is_completed: self.is_completed,
            completed_at: self.completed_at,
            time_spent: self.time_spent,
            score: self.score,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Progress repository.
#[derive(Clone)]
pub struct SurrealProgressRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProgressRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProgressRepository for SurrealProgressRepository<C> {
    async fn create(&self, input: CreateProgress) -> LecternResult<Progress> {
        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(format!(
                "CREATE type::record('progress', $id) SET \
                 student_id = $student_id, course_id = $course_id, \
                 lesson_id = $lesson_id, is_completed = $is_completed, \
                 completed_at = $completed_at, time_spent = $time_spent, \
                 score = $score; \
                 {SELECT_PROGRESS};"
            ))
            .bind(("id", id_str.clone()))
            .bind(("student_id", input.student_id.to_string()))
            .bind(("course_id", input.course_id.to_string()))
            .bind(("lesson_id", input.lesson_id.to_string()))
            .bind(("is_completed", input.is_completed))
            .bind(("completed_at", input.completed_at))
            .bind(("time_spent", input.time_spent.unwrap_or(0)))
            .bind(("score", input.score))
            .await
            .map_err(|e| DbError::statement("progress", e))?
            .check()
            .map_err(|e| DbError::statement("progress", e))?;

        let rows: Vec<ProgressRow> = result.take(1).map_err(DbError::from)?;
        let progress = single(rows, "progress", id_str)?.try_into_progress()?;
        debug!(
            progress_id = %progress.id,
            lesson_id = %progress.lesson_id,
            completed = progress.is_completed,
            "Progress created"
        );
        Ok(progress)
    }

    async fn find(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> LecternResult<Option<Progress>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM progress \
                 WHERE student_id = $student_id AND course_id = $course_id \
                 AND lesson_id = $lesson_id LIMIT 1",
            )
            .bind(("student_id", student_id.to_string()))
            .bind(("course_id", course_id.to_string()))
            .bind(("lesson_id", lesson_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProgressRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.try_into_progress())
            .transpose()?)
    }

    async fn update(&self, id: Uuid, input: UpdateProgress) -> LecternResult<Progress> {
        let id_str = id.to_string();

        // Completion state is always rewritten; metrics only when supplied.
        let mut sets = vec!["is_completed = $is_completed", "completed_at = $completed_at"];
        if input.time_spent.is_some() {
            sets.push("time_spent = $time_spent");
        }
        if input.score.is_some() {
            sets.push("score = $score");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('progress', $id) SET {}; {SELECT_PROGRESS};",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("is_completed", input.is_completed))
            .bind(("completed_at", input.completed_at));
        if let Some(time_spent) = input.time_spent {
            builder = builder.bind(("time_spent", time_spent));
        }
        if let Some(score) = input.score {
            builder = builder.bind(("score", score));
        }

        let mut result = builder
            .await
            .map_err(|e| DbError::statement("progress", e))?
            .check()
            .map_err(|e| DbError::statement("progress", e))?;

        let rows: Vec<ProgressRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, "progress", id_str)?.try_into_progress()?)
    }

    async fn list_for_student(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> LecternResult<Vec<Progress>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM progress \
                 WHERE student_id = $student_id AND course_id = $course_id \
                 ORDER BY created_at ASC",
            )
            .bind(("student_id", student_id.to_string()))
            .bind(("course_id", course_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProgressRow> = result.take(0).map_err(DbError::from)?;
        let progress = rows
            .into_iter()
            .map(|row| row.try_into_progress())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(progress)
    }
}
