//! SurrealDB repository implementations.

mod category;
mod course;
mod enrollment;
mod lesson;
mod progress;
mod review;
mod support;
mod user;

pub use category::SurrealCategoryRepository;
pub use course::SurrealCourseRepository;
pub use enrollment::SurrealEnrollmentRepository;
pub use lesson::SurrealLessonRepository;
pub use progress::SurrealProgressRepository;
pub use review::SurrealReviewRepository;
pub use user::SurrealUserRepository;
