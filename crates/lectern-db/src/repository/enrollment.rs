//! SurrealDB implementation of [`EnrollmentRepository`].

use chrono::{DateTime, Utc};
use lectern_core::error::LecternResult;
use lectern_core::models::enrollment::{CreateEnrollment, Enrollment, EnrollmentStatus};
use lectern_core::repository::EnrollmentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::support::{CountRow, first_count, parse_enum, parse_uuid, single};
use crate::error::DbError;

const SELECT_ENROLLMENT: &str =
    "SELECT meta::id(id) AS record_id, * FROM type::record('enrollment', $id)";

#[derive(Debug, SurrealValue)]
struct EnrollmentRow {
    record_id: String,
    student_id: String,
    course_id: String,
    status: String,
    enrolled_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl EnrollmentRow {
    fn try_into_enrollment(self) -> Result<Enrollment, DbError> {
        Ok(Enrollment {
            id: parse_uuid("enrollment", &self.record_id)?,
            student_id: parse_uuid("student", &self.student_id)?,
            course_id: parse_uuid("course", &self.course_id)?,
            status: parse_enum(&self.status)?,
            enrolled_at: self.enrolled_at,
            completed_at: self.completed_at,
            updated_at: self.updated_at,
        })
    }
}

fn collect(rows: Vec<EnrollmentRow>) -> Result<Vec<Enrollment>, DbError> {
    rows.into_iter()
        .map(|row| row.try_into_enrollment())
        .collect()
}

/// SurrealDB implementation of the Enrollment repository.
#[derive(Clone)]
pub struct SurrealEnrollmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEnrollmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> EnrollmentRepository for SurrealEnrollmentRepository<C> {
    async fn create(&self, input: CreateEnrollment) -> LecternResult<Enrollment> {
        let id_str = Uuid::new_v4().to_string();

        // idx_enrollment_student_course rejects the second of two racing
        // inserts for the same pair.
        let mut result = self
            .db
            .query(format!(
                "CREATE type::record('enrollment', $id) SET \
                 student_id = $student_id, course_id = $course_id, \
                 status = 'active'; \
                 {SELECT_ENROLLMENT};"
            ))
            .bind(("id", id_str.clone()))
            .bind(("student_id", input.student_id.to_string()))
            .bind(("course_id", input.course_id.to_string()))
            .await
            .map_err(|e| DbError::statement("enrollment", e))?
            .check()
            .map_err(|e| DbError::statement("enrollment", e))?;

        let rows: Vec<EnrollmentRow> = result.take(1).map_err(DbError::from)?;
        let enrollment = single(rows, "enrollment", id_str)?.try_into_enrollment()?;
        debug!(
            enrollment_id = %enrollment.id,
            student_id = %enrollment.student_id,
            course_id = %enrollment.course_id,
            "Enrollment created"
        );
        Ok(enrollment)
    }

    async fn find(&self, student_id: Uuid, course_id: Uuid) -> LecternResult<Option<Enrollment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM enrollment \
                 WHERE student_id = $student_id AND course_id = $course_id \
                 LIMIT 1",
            )
            .bind(("student_id", student_id.to_string()))
            .bind(("course_id", course_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EnrollmentRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.try_into_enrollment())
            .transpose()?)
    }

    async fn delete(&self, id: Uuid) -> LecternResult<()> {
        self.db
            .query("DELETE type::record('enrollment', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("enrollment", e))?;

        debug!(enrollment_id = %id, "Enrollment deleted");
        Ok(())
    }

    async fn list_by_student(&self, student_id: Uuid) -> LecternResult<Vec<Enrollment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM enrollment \
                 WHERE student_id = $student_id \
                 ORDER BY enrolled_at DESC",
            )
            .bind(("student_id", student_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EnrollmentRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn list_by_course(&self, course_id: Uuid) -> LecternResult<Vec<Enrollment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM enrollment \
                 WHERE course_id = $course_id \
                 ORDER BY enrolled_at DESC",
            )
            .bind(("course_id", course_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EnrollmentRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn count(&self, status: Option<EnrollmentStatus>) -> LecternResult<u64> {
        let query = match status {
            Some(_) => "SELECT count() AS total FROM enrollment WHERE status = $status GROUP ALL",
            None => "SELECT count() AS total FROM enrollment GROUP ALL",
        };

        let mut result = self
            .db
            .query(query)
            .bind(("status", status.map(|s| s.as_str().to_string())))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_count(rows))
    }
}
