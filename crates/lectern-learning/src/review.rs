//! Course reviews: one per student and course.

use lectern_core::error::LecternResult;
use lectern_core::models::principal::Principal;
use lectern_core::models::review::{CreateReview, Review, UpdateReview};
use lectern_core::repository::{CourseRepository, ReviewRepository, UserRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{LearningError, on_conflict};
use crate::guard::{self, Action, Resource};

/// A review with the reviewer's display name.
#[derive(Debug, Clone, Serialize)]
pub struct CourseReview {
    pub review: Review,
    pub reviewer_name: String,
}

fn check_rating(rating: u8) -> Result<(), LearningError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(LearningError::Invalid(format!(
            "rating must be between 1 and 5, got {rating}"
        )))
    }
}

pub struct ReviewService<R: ReviewRepository, C: CourseRepository, U: UserRepository> {
    reviews: R,
    courses: C,
    users: U,
}

impl<R, C, U> ReviewService<R, C, U>
where
    R: ReviewRepository,
    C: CourseRepository,
    U: UserRepository,
{
    pub fn new(reviews: R, courses: C, users: U) -> Self {
        Self {
            reviews,
            courses,
            users,
        }
    }

    pub async fn create_review(
        &self,
        principal: &Principal,
        course_id: Uuid,
        rating: u8,
        comment: Option<String>,
    ) -> LecternResult<Review> {
        self.courses.get_by_id(course_id).await?;
        check_rating(rating)?;

        if self
            .reviews
            .find(principal.user_id, course_id)
            .await?
            .is_some()
        {
            return Err(LearningError::AlreadyReviewed.into());
        }

        let review = self
            .reviews
            .create(CreateReview {
                student_id: principal.user_id,
                course_id,
                rating,
                comment,
            })
            .await
            .map_err(|e| on_conflict(e, LearningError::AlreadyReviewed))?;

        info!(review_id = %review.id, course_id = %course_id, rating, "Review created");
        Ok(review)
    }

    /// Reviews of a course, newest first.
    pub async fn list_course_reviews(&self, course_id: Uuid) -> LecternResult<Vec<CourseReview>> {
        self.courses.get_by_id(course_id).await?;
        let reviews = self.reviews.list_by_course(course_id).await?;

        let mut listing = Vec::with_capacity(reviews.len());
        for review in reviews {
            let reviewer = self.users.get_by_id(review.student_id).await?;
            listing.push(CourseReview {
                review,
                reviewer_name: reviewer.full_name(),
            });
        }
        Ok(listing)
    }

    pub async fn update_review(
        &self,
        principal: &Principal,
        id: Uuid,
        changes: UpdateReview,
    ) -> LecternResult<Review> {
        let review = self.reviews.get_by_id(id).await?;
        guard::authorize(
            principal,
            Action::Update,
            Resource::Review {
                student_id: review.student_id,
            },
        )?;
        if let Some(rating) = changes.rating {
            check_rating(rating)?;
        }

        self.reviews.update(id, changes).await
    }

    pub async fn delete_review(&self, principal: &Principal, id: Uuid) -> LecternResult<()> {
        let review = self.reviews.get_by_id(id).await?;
        guard::authorize(
            principal,
            Action::Delete,
            Resource::Review {
                student_id: review.student_id,
            },
        )?;

        self.reviews.delete(id).await?;
        info!(review_id = %id, deleted_by = %principal.user_id, "Review deleted");
        Ok(())
    }
}
