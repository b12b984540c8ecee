//! SurrealDB implementation of [`CourseRepository`].

use chrono::{DateTime, Utc};
use lectern_core::error::LecternResult;
use lectern_core::models::course::{Course, CourseFilter, CreateCourse, UpdateCourse};
use lectern_core::repository::{CourseRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::support::{CountRow, first_count, parse_enum, parse_uuid, single};
use crate::error::DbError;

const SELECT_COURSE: &str = "SELECT meta::id(id) AS record_id, * FROM type::record('course', $id)";

#[derive(Debug, SurrealValue)]
struct CourseRow {
    record_id: String,
    instructor_id: String,
    category_id: String,
    title: String,
    description: String,
    price: f64,
    status: String,
    level: Option<String>,
    language: Option<String>,
    duration: Option<u32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CourseRow {
    fn try_into_course(self) -> Result<Course, DbError> {
        Ok(Course {
            id: parse_uuid("course", &self.record_id)?,
            instructor_id: parse_uuid("instructor", &self.instructor_id)?,
            category_id: parse_uuid("category", &self.category_id)?,
            title: self.title,
            description: self.description,
            price: self.price,
            status: parse_enum(&self.status)?,
            level: self.level,
            language: self.language,
            duration: self.duration,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn where_clause(filter: &CourseFilter) -> String {
    let mut conditions = Vec::new();
    if filter.search.is_some() {
        conditions.push(
            "(string::contains(string::lowercase(title), $search) \
             OR string::contains(string::lowercase(description), $search))",
        );
    }
    if filter.category_id.is_some() {
        conditions.push("category_id = $category_id");
    }
    if filter.instructor_id.is_some() {
        conditions.push("instructor_id = $instructor_id");
    }
    if filter.status.is_some() {
        conditions.push("status = $status");
    }
    if filter.level.is_some() {
        conditions.push("level = $level");
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

/// SurrealDB implementation of the Course repository.
#[derive(Clone)]
pub struct SurrealCourseRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCourseRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CourseRepository for SurrealCourseRepository<C> {
    async fn create(&self, input: CreateCourse) -> LecternResult<Course> {
        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(format!(
                "CREATE type::record('course', $id) SET \
                 instructor_id = $instructor_id, category_id = $category_id, \
                 title = $title, description = $description, \
                 price = $price, status = $status, \
                 level = $level, language = $language, duration = $duration; \
                 {SELECT_COURSE};"
            ))
            .bind(("id", id_str.clone()))
            .bind(("instructor_id", input.instructor_id.to_string()))
            .bind(("category_id", input.category_id.to_string()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("price", input.price))
            .bind(("status", input.status.as_str().to_string()))
            .bind(("level", input.level))
            .bind(("language", input.language))
            .bind(("duration", input.duration))
            .await
            .map_err(|e| DbError::statement("course", e))?
            .check()
            .map_err(|e| DbError::statement("course", e))?;

        let rows: Vec<CourseRow> = result.take(1).map_err(DbError::from)?;
        let course = single(rows, "course", id_str)?.try_into_course()?;
        debug!(course_id = %course.id, instructor_id = %course.instructor_id, "Course created");
        Ok(course)
    }

    async fn get_by_id(&self, id: Uuid) -> LecternResult<Course> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_COURSE)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CourseRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, "course", id_str)?.try_into_course()?)
    }

    async fn update(&self, id: Uuid, input: UpdateCourse) -> LecternResult<Course> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.category_id.is_some() {
            sets.push("category_id = $category_id");
        }
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.price.is_some() {
            sets.push("price = $price");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.level.is_some() {
            sets.push("level = $level");
        }
        if input.language.is_some() {
            sets.push("language = $language");
        }
        if input.duration.is_some() {
            sets.push("duration = $duration");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('course', $id) SET {}; {SELECT_COURSE};",
            sets.join(", ")
        );

        let mut builder = self.db.query(query).bind(("id", id_str.clone()));
        if let Some(category_id) = input.category_id {
            builder = builder.bind(("category_id", category_id.to_string()));
        }
        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(price) = input.price {
            builder = builder.bind(("price", price));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(level) = input.level {
            builder = builder.bind(("level", level));
        }
        if let Some(language) = input.language {
            builder = builder.bind(("language", language));
        }
        if let Some(duration) = input.duration {
            builder = builder.bind(("duration", duration));
        }

        let mut result = builder
            .await
            .map_err(|e| DbError::statement("course", e))?
            .check()
            .map_err(|e| DbError::statement("course", e))?;

        let rows: Vec<CourseRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, "course", id_str)?.try_into_course()?)
    }

    async fn delete(&self, id: Uuid) -> LecternResult<()> {
        let id_str = id.to_string();

        // Dependent rows go with the course in one transaction.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE progress WHERE course_id = $id; \
                 DELETE enrollment WHERE course_id = $id; \
                 DELETE review WHERE course_id = $id; \
                 DELETE lesson WHERE course_id = $id; \
                 DELETE type::record('course', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("course", e))?;

        debug!(course_id = %id_str, "Course deleted");
        Ok(())
    }

    async fn list(
        &self,
        filter: CourseFilter,
        pagination: Pagination,
    ) -> LecternResult<PaginatedResult<Course>> {
        let clause = where_clause(&filter);
        let query = format!(
            "SELECT count() AS total FROM course {clause} GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM course {clause} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset;"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("search", filter.search.map(|s| s.to_lowercase())))
            .bind(("category_id", filter.category_id.map(|id| id.to_string())))
            .bind((
                "instructor_id",
                filter.instructor_id.map(|id| id.to_string()),
            ))
            .bind(("status", filter.status.map(|s| s.as_str().to_string())))
            .bind(("level", filter.level))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let rows: Vec<CourseRow> = result.take(1).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_course())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: first_count(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_by_instructor(&self, instructor_id: Uuid) -> LecternResult<Vec<Course>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM course \
                 WHERE instructor_id = $instructor_id \
                 ORDER BY created_at ASC",
            )
            .bind(("instructor_id", instructor_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CourseRow> = result.take(0).map_err(DbError::from)?;
        let courses = rows
            .into_iter()
            .map(|row| row.try_into_course())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(courses)
    }

    async fn count(&self) -> LecternResult<u64> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM course GROUP ALL")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_count(rows))
    }

    async fn count_by_category(&self, category_id: Uuid) -> LecternResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM course \
                 WHERE category_id = $category_id GROUP ALL",
            )
            .bind(("category_id", category_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_count(rows))
    }
}
