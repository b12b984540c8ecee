//! Integration tests for category, course and lesson repositories.

use lectern_core::error::LecternError;
use lectern_core::models::category::{CreateCategory, UpdateCategory};
use lectern_core::models::course::{CourseFilter, CourseStatus, CreateCourse, UpdateCourse};
use lectern_core::models::enrollment::CreateEnrollment;
use lectern_core::models::lesson::{CreateLesson, LessonType, UpdateLesson};
use lectern_core::models::progress::CreateProgress;
use lectern_core::repository::{
    CategoryRepository, CourseRepository, EnrollmentRepository, LessonRepository, Pagination,
    ProgressRepository,
};
use lectern_db::repository::{
    SurrealCategoryRepository, SurrealCourseRepository, SurrealEnrollmentRepository,
    SurrealLessonRepository, SurrealProgressRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> (Surreal<Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lectern_db::run_migrations(&db).await.unwrap();

    let category = SurrealCategoryRepository::new(db.clone())
        .create(CreateCategory {
            name: "Programming".into(),
            description: None,
        })
        .await
        .unwrap();

    (db, category.id)
}

fn new_course(instructor_id: Uuid, category_id: Uuid, title: &str) -> CreateCourse {
    CreateCourse {
        instructor_id,
        category_id,
        title: title.into(),
        description: format!("All about {title}"),
        price: 49.5,
        status: CourseStatus::Published,
        level: Some("beginner".into()),
        language: Some("en".into()),
        duration: Some(120),
    }
}

fn new_lesson(course_id: Uuid, title: &str, position: u32) -> CreateLesson {
    CreateLesson {
        course_id,
        title: title.into(),
        description: None,
        content: "content".into(),
        position,
        lesson_type: LessonType::Text,
        duration: Some(10),
        video_url: None,
    }
}

#[tokio::test]
async fn category_crud() {
    let (db, category_id) = setup().await;
    let repo = SurrealCategoryRepository::new(db);

    repo.create(CreateCategory {
        name: "Design".into(),
        description: Some("Visual things".into()),
    })
    .await
    .unwrap();

    let names: Vec<String> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Design", "Programming"]);

    let updated = repo
        .update(
            category_id,
            UpdateCategory {
                description: Some(Some("Code".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Programming");
    assert_eq!(updated.description.as_deref(), Some("Code"));

    let dup = repo
        .create(CreateCategory {
            name: "Design".into(),
            description: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(dup, LecternError::Conflict { .. }));

    repo.delete(category_id).await.unwrap();
    assert!(matches!(
        repo.get_by_id(category_id).await.unwrap_err(),
        LecternError::NotFound { .. }
    ));
}

#[tokio::test]
async fn create_get_and_update_course() {
    let (db, category_id) = setup().await;
    let repo = SurrealCourseRepository::new(db);
    let instructor_id = Uuid::new_v4();

    let course = repo
        .create(new_course(instructor_id, category_id, "Rust"))
        .await
        .unwrap();
    assert_eq!(course.instructor_id, instructor_id);
    assert_eq!(course.price, 49.5);
    assert!(course.is_published());

    let updated = repo
        .update(
            course.id,
            UpdateCourse {
                status: Some(CourseStatus::Archived),
                level: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, CourseStatus::Archived);
    assert_eq!(updated.level, None);
    assert_eq!(updated.title, "Rust");

    let missing = repo
        .update(Uuid::new_v4(), UpdateCourse::default())
        .await
        .unwrap_err();
    assert!(matches!(missing, LecternError::NotFound { .. }));
}

#[tokio::test]
async fn negative_price_is_a_validation_error() {
    let (db, category_id) = setup().await;
    let repo = SurrealCourseRepository::new(db);

    let err = repo
        .create(CreateCourse {
            price: -1.0,
            ..new_course(Uuid::new_v4(), category_id, "Cheap")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::Validation { .. }), "got {err:?}");
}

#[tokio::test]
async fn courses_are_counted_per_category() {
    let (db, category_id) = setup().await;
    let repo = SurrealCourseRepository::new(db);

    assert_eq!(repo.count_by_category(category_id).await.unwrap(), 0);
    repo.create(new_course(Uuid::new_v4(), category_id, "Rust"))
        .await
        .unwrap();
    repo.create(new_course(Uuid::new_v4(), category_id, "Go"))
        .await
        .unwrap();

    assert_eq!(repo.count_by_category(category_id).await.unwrap(), 2);
    assert_eq!(repo.count_by_category(Uuid::new_v4()).await.unwrap(), 0);
}

#[tokio::test]
async fn course_list_filters_and_paginates() {
    let (db, category_id) = setup().await;
    let repo = SurrealCourseRepository::new(db);
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    repo.create(new_course(alice, category_id, "Async Rust"))
        .await
        .unwrap();
    repo.create(new_course(alice, category_id, "Embedded Rust"))
        .await
        .unwrap();
    repo.create(CreateCourse {
        status: CourseStatus::Draft,
        ..new_course(bob, category_id, "Go Basics")
    })
    .await
    .unwrap();

    let rust = repo
        .list(
            CourseFilter {
                search: Some("RUST".into()),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(rust.total, 2);

    let published = repo
        .list(
            CourseFilter {
                status: Some(CourseStatus::Published),
                ..Default::default()
            },
            Pagination {
                offset: 0,
                limit: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(published.total, 2);
    assert_eq!(published.items.len(), 1);

    let by_bob = repo
        .list(
            CourseFilter {
                instructor_id: Some(bob),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_bob.items.len(), 1);
    assert_eq!(by_bob.items[0].title, "Go Basics");

    assert_eq!(repo.list_by_instructor(alice).await.unwrap().len(), 2);
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn lessons_are_ordered_and_scoped_to_their_course() {
    let (db, category_id) = setup().await;
    let courses = SurrealCourseRepository::new(db.clone());
    let lessons = SurrealLessonRepository::new(db);
    let instructor = Uuid::new_v4();

    let course = courses
        .create(new_course(instructor, category_id, "Rust"))
        .await
        .unwrap();
    let other = courses
        .create(new_course(instructor, category_id, "Other"))
        .await
        .unwrap();

    let third = lessons
        .create(new_lesson(course.id, "Third", 3))
        .await
        .unwrap();
    lessons
        .create(new_lesson(course.id, "First", 1))
        .await
        .unwrap();
    lessons
        .create(new_lesson(course.id, "Second", 2))
        .await
        .unwrap();

    let titles: Vec<String> = lessons
        .list_by_course(course.id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.title)
        .collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);
    assert_eq!(lessons.count_by_course(course.id).await.unwrap(), 3);

    let err = lessons.get_in_course(other.id, third.id).await.unwrap_err();
    assert!(matches!(err, LecternError::NotFound { .. }));

    let err = lessons
        .update(
            other.id,
            third.id,
            UpdateLesson {
                title: Some("Hijacked".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::NotFound { .. }));

    let renamed = lessons
        .update(
            course.id,
            third.id,
            UpdateLesson {
                title: Some("Finale".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.title, "Finale");
    assert_eq!(renamed.position, 3);
}

#[tokio::test]
async fn deleting_a_lesson_removes_its_progress() {
    let (db, category_id) = setup().await;
    let courses = SurrealCourseRepository::new(db.clone());
    let lessons = SurrealLessonRepository::new(db.clone());
    let progress = SurrealProgressRepository::new(db);
    let student = Uuid::new_v4();

    let course = courses
        .create(new_course(Uuid::new_v4(), category_id, "Rust"))
        .await
        .unwrap();
    let lesson = lessons.create(new_lesson(course.id, "Only", 1)).await.unwrap();
    progress
        .create(CreateProgress {
            student_id: student,
            course_id: course.id,
            lesson_id: lesson.id,
            is_completed: true,
            completed_at: Some(chrono::Utc::now()),
            time_spent: None,
            score: None,
        })
        .await
        .unwrap();

    lessons.delete(course.id, lesson.id).await.unwrap();

    assert!(
        progress
            .find(student, course.id, lesson.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(matches!(
        lessons.delete(course.id, lesson.id).await.unwrap_err(),
        LecternError::NotFound { .. }
    ));
}

#[tokio::test]
async fn deleting_a_course_cascades() {
    let (db, category_id) = setup().await;
    let courses = SurrealCourseRepository::new(db.clone());
    let lessons = SurrealLessonRepository::new(db.clone());
    let enrollments = SurrealEnrollmentRepository::new(db);
    let student = Uuid::new_v4();

    let course = courses
        .create(new_course(Uuid::new_v4(), category_id, "Rust"))
        .await
        .unwrap();
    lessons.create(new_lesson(course.id, "One", 1)).await.unwrap();
    enrollments
        .create(CreateEnrollment {
            student_id: student,
            course_id: course.id,
        })
        .await
        .unwrap();

    courses.delete(course.id).await.unwrap();

    assert!(matches!(
        courses.get_by_id(course.id).await.unwrap_err(),
        LecternError::NotFound { .. }
    ));
    assert!(lessons.list_by_course(course.id).await.unwrap().is_empty());
    assert!(enrollments.find(student, course.id).await.unwrap().is_none());
}
