//! SurrealDB implementation of [`ReviewRepository`].

use chrono::{DateTime, Utc};
use lectern_core::error::LecternResult;
use lectern_core::models::review::{CreateReview, Review, UpdateReview};
use lectern_core::repository::ReviewRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::support::{parse_uuid, single};
use crate::error::DbError;

const SELECT_REVIEW: &str = "SELECT meta::id(id) AS record_id, * FROM type::record('review', $id)";

#[derive(Debug, SurrealValue)]
struct ReviewRow {
    record_id: String,
    student_id: String,
    course_id: String,
    rating: u32,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReviewRow {
    fn try_into_review(self) -> Result<Review, DbError> {
        let rating = u8::try_from(self.rating)
            .map_err(|_| DbError::Decode(format!("rating out of range: {}", self.rating)))?;
        Ok(Review {
            id: parse_uuid("review", &self.record_id)?,
            student_id: parse_uuid("student", &self.student_id)?,
            course_id: parse_uuid("course", &self.course_id)?,
            rating,
            comment: self.comment,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Review repository.
#[derive(Clone)]
pub struct SurrealReviewRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReviewRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ReviewRepository for SurrealReviewRepository<C> {
    async fn create(&self, input: CreateReview) -> LecternResult<Review> {
        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(format!(
                "CREATE type::record('review', $id) SET \
                 student_id = $student_id, course_id = $course_id, \
                 rating = $rating, comment = $comment; \
                 {SELECT_REVIEW};"
            ))
            .bind(("id", id_str.clone()))
            .bind(("student_id", input.student_id.to_string()))
            .bind(("course_id", input.course_id.to_string()))
            .bind(("rating", u32::from(input.rating)))
            .bind(("comment", input.comment))
            .await
            .map_err(|e| DbError::statement("review", e))?
            .check()
            .map_err(|e| DbError::statement("review", e))?;

        let rows: Vec<ReviewRow> = result.take(1).map_err(DbError::from)?;
        let review = single(rows, "review", id_str)?.try_into_review()?;
        debug!(review_id = %review.id, course_id = %review.course_id, "Review created");
        Ok(review)
    }

    async fn get_by_id(&self, id: Uuid) -> LecternResult<Review> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_REVIEW)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, "review", id_str)?.try_into_review()?)
    }

    async fn find(&self, student_id: Uuid, course_id: Uuid) -> LecternResult<Option<Review>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM review \
                 WHERE student_id = $student_id AND course_id = $course_id \
                 LIMIT 1",
            )
            .bind(("student_id", student_id.to_string()))
            .bind(("course_id", course_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.try_into_review())
            .transpose()?)
    }

    async fn update(&self, id: Uuid, input: UpdateReview) -> LecternResult<Review> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.rating.is_some() {
            sets.push("rating = $rating");
        }
        if input.comment.is_some() {
            sets.push("comment = $comment");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('review', $id) SET {}; {SELECT_REVIEW};",
            sets.join(", ")
        );

        let mut builder = self.db.query(query).bind(("id", id_str.clone()));
        if let Some(rating) = input.rating {
            builder = builder.bind(("rating", u32::from(rating)));
        }
        if let Some(comment) = input.comment {
            builder = builder.bind(("comment", comment));
        }

        let mut result = builder
            .await
            .map_err(|e| DbError::statement("review", e))?
            .check()
            .map_err(|e| DbError::statement("review", e))?;

        let rows: Vec<ReviewRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, "review", id_str)?.try_into_review()?)
    }

    async fn delete(&self, id: Uuid) -> LecternResult<()> {
        self.db
            .query("DELETE type::record('review', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("review", e))?;

        Ok(())
    }

    async fn list_by_course(&self, course_id: Uuid) -> LecternResult<Vec<Review>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM review \
                 WHERE course_id = $course_id \
                 ORDER BY created_at DESC",
            )
            .bind(("course_id", course_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let reviews = rows
            .into_iter()
            .map(|row| row.try_into_review())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(reviews)
    }
}
