//! Integration tests for the catalog, review, account and admin
//! services against in-memory SurrealDB.

use lectern_core::error::LecternError;
use lectern_core::models::category::CreateCategory;
use lectern_core::models::course::{CourseFilter, CourseStatus, UpdateCourse};
use lectern_core::models::lesson::{LessonType, UpdateLesson};
use lectern_core::models::principal::Principal;
use lectern_core::models::review::UpdateReview;
use lectern_core::models::user::{UserRole, UserStatus};
use lectern_db::repository::{
    SurrealCategoryRepository, SurrealCourseRepository, SurrealEnrollmentRepository,
    SurrealLessonRepository, SurrealReviewRepository, SurrealUserRepository,
};
use lectern_learning::account::{AccountService, NewAccount, ProfileChanges};
use lectern_learning::admin::AdminService;
use lectern_learning::catalog::{CatalogService, NewCourse, NewLesson};
use lectern_learning::config::LearningConfig;
use lectern_learning::enrollment::EnrollmentService;
use lectern_learning::paging::PageRequest;
use lectern_learning::review::ReviewService;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Catalog = CatalogService<
    SurrealCourseRepository<Db>,
    SurrealLessonRepository<Db>,
    SurrealCategoryRepository<Db>,
    SurrealUserRepository<Db>,
>;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lectern_db::run_migrations(&db).await.unwrap();
    db
}

fn accounts(db: &Surreal<Db>) -> AccountService<SurrealUserRepository<Db>> {
    AccountService::new(SurrealUserRepository::new(db.clone()))
}

fn catalog(db: &Surreal<Db>) -> Catalog {
    CatalogService::new(
        SurrealCourseRepository::new(db.clone()),
        SurrealLessonRepository::new(db.clone()),
        SurrealCategoryRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        LearningConfig::default(),
    )
}

async fn register(db: &Surreal<Db>, email: &str, role: UserRole) -> Principal {
    let user = accounts(db)
        .register(NewAccount {
            email: email.into(),
            password: "CorrectHorse42!".into(),
            first_name: "Test".into(),
            last_name: email.split('@').next().unwrap_or_default().into(),
            role: Some(role),
        })
        .await
        .unwrap();
    Principal::from(&user)
}

async fn category(db: &Surreal<Db>, admin: &Principal, name: &str) -> Uuid {
    catalog(db)
        .create_category(
            admin,
            CreateCategory {
                name: name.into(),
                description: None,
            },
        )
        .await
        .unwrap()
        .id
}

fn new_course(category_id: Uuid, title: &str) -> NewCourse {
    NewCourse {
        category_id,
        title: title.into(),
        description: format!("Learn {title}"),
        price: 25.0,
        status: Some(CourseStatus::Published),
        level: Some("beginner".into()),
        language: Some("en".into()),
        duration: None,
    }
}

fn new_lesson(title: &str, position: u32) -> NewLesson {
    NewLesson {
        title: title.into(),
        description: None,
        content: "body".into(),
        position,
        lesson_type: LessonType::Video,
        duration: Some(5),
        video_url: Some("https://videos.example.com/1".into()),
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_defaults_to_active_student() {
    let db = setup().await;
    let user = accounts(&db)
        .register(NewAccount {
            email: "  New@Example.com ".into(),
            password: "CorrectHorse42!".into(),
            first_name: "New".into(),
            last_name: "Person".into(),
            role: None,
        })
        .await
        .unwrap();

    assert_eq!(user.email, "new@example.com");
    assert_eq!(user.role, UserRole::Student);
    assert_eq!(user.status, UserStatus::Active);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let db = setup().await;
    register(&db, "dup@example.com", UserRole::Student).await;

    let err = accounts(&db)
        .register(NewAccount {
            email: "dup@example.com".into(),
            password: "whatever".into(),
            first_name: "Again".into(),
            last_name: "Again".into(),
            role: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::Conflict { .. }));
}

#[tokio::test]
async fn authenticate_resolves_principal() {
    let db = setup().await;
    let registered = register(&db, "ann@example.com", UserRole::Instructor).await;
    let svc = accounts(&db);

    let principal = svc
        .authenticate("ann@example.com", "CorrectHorse42!")
        .await
        .unwrap();
    assert_eq!(principal, registered);

    for (email, password) in [
        ("ann@example.com", "wrong"),
        ("nobody@example.com", "CorrectHorse42!"),
    ] {
        let err = svc.authenticate(email, password).await.unwrap_err();
        assert!(matches!(err, LecternError::AuthenticationFailed { .. }));
    }
}

#[tokio::test]
async fn suspended_accounts_cannot_authenticate() {
    let db = setup().await;
    let admin = register(&db, "root@example.com", UserRole::Admin).await;
    let student = register(&db, "bad@example.com", UserRole::Student).await;

    let admin_svc = AdminService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealCourseRepository::new(db.clone()),
        SurrealEnrollmentRepository::new(db.clone()),
        LearningConfig::default(),
    );
    let updated = admin_svc
        .update_user_status(&admin, student.user_id, UserStatus::Suspended)
        .await
        .unwrap();
    assert_eq!(updated.status, UserStatus::Suspended);

    let err = accounts(&db)
        .authenticate("bad@example.com", "CorrectHorse42!")
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn profile_can_be_updated() {
    let db = setup().await;
    let me = register(&db, "me@example.com", UserRole::Student).await;
    let svc = accounts(&db);

    let updated = svc
        .update_profile(
            &me,
            ProfileChanges {
                bio: Some(Some("Learning Rust".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.bio.as_deref(), Some("Learning Rust"));
    assert_eq!(svc.profile(&me).await.unwrap().first_name, "Test");
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn category_mutations_are_admin_only() {
    let db = setup().await;
    let admin = register(&db, "root@example.com", UserRole::Admin).await;
    let teacher = register(&db, "t@example.com", UserRole::Instructor).await;
    let svc = catalog(&db);

    let err = svc
        .create_category(
            &teacher,
            CreateCategory {
                name: "Art".into(),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::AuthorizationDenied { .. }));

    let art = category(&db, &admin, "Art").await;
    let err = svc
        .create_category(
            &admin,
            CreateCategory {
                name: "Art".into(),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::Conflict { .. }));

    assert_eq!(svc.list_categories().await.unwrap().len(), 1);
    svc.delete_category(&admin, art).await.unwrap();
    assert!(matches!(
        svc.get_category(art).await.unwrap_err(),
        LecternError::NotFound { .. }
    ));
}

#[tokio::test]
async fn category_with_courses_cannot_be_deleted() {
    let db = setup().await;
    let admin = register(&db, "root@example.com", UserRole::Admin).await;
    let owner = register(&db, "owner@example.com", UserRole::Instructor).await;
    let svc = catalog(&db);

    let category_id = category(&db, &admin, "Programming").await;
    let course = svc
        .create_course(&owner, new_course(category_id, "Rust"))
        .await
        .unwrap();

    let err = svc.delete_category(&admin, category_id).await.unwrap_err();
    match err {
        LecternError::Conflict { reason } => assert!(reason.contains("1 course"), "{reason}"),
        other => panic!("expected conflict, got {other:?}"),
    }

    let detail = svc.get_course(course.id, false).await.unwrap();
    assert_eq!(detail.category_name, "Programming");

    svc.delete_course(&owner, course.id).await.unwrap();
    svc.delete_category(&admin, category_id).await.unwrap();
    assert!(matches!(
        svc.get_category(category_id).await.unwrap_err(),
        LecternError::NotFound { .. }
    ));
}

#[tokio::test]
async fn course_lifecycle_respects_ownership() {
    let db = setup().await;
    let admin = register(&db, "root@example.com", UserRole::Admin).await;
    let owner = register(&db, "owner@example.com", UserRole::Instructor).await;
    let rival = register(&db, "rival@example.com", UserRole::Instructor).await;
    let student = register(&db, "stu@example.com", UserRole::Student).await;
    let category_id = category(&db, &admin, "Programming").await;
    let svc = catalog(&db);

    let err = svc
        .create_course(&student, new_course(category_id, "Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::AuthorizationDenied { .. }));

    let err = svc
        .create_course(&owner, new_course(Uuid::new_v4(), "Orphan"))
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::NotFound { .. }));

    let err = svc
        .create_course(
            &owner,
            NewCourse {
                price: -5.0,
                ..new_course(category_id, "Negative")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::Validation { .. }));

    let course = svc
        .create_course(
            &owner,
            NewCourse {
                status: None,
                ..new_course(category_id, "Rust")
            },
        )
        .await
        .unwrap();
    assert_eq!(course.instructor_id, owner.user_id);
    assert_eq!(course.status, CourseStatus::Draft);

    let publish = UpdateCourse {
        status: Some(CourseStatus::Published),
        ..Default::default()
    };
    let err = svc
        .update_course(&rival, course.id, publish.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::AuthorizationDenied { .. }));

    let published = svc.update_course(&owner, course.id, publish).await.unwrap();
    assert_eq!(published.status, CourseStatus::Published);

    let err = svc.delete_course(&rival, course.id).await.unwrap_err();
    assert!(matches!(err, LecternError::AuthorizationDenied { .. }));
    svc.delete_course(&admin, course.id).await.unwrap();
    assert!(matches!(
        svc.get_course(course.id, false).await.unwrap_err(),
        LecternError::NotFound { .. }
    ));
}

#[tokio::test]
async fn course_detail_and_lessons() {
    let db = setup().await;
    let admin = register(&db, "root@example.com", UserRole::Admin).await;
    let owner = register(&db, "owner@example.com", UserRole::Instructor).await;
    let rival = register(&db, "rival@example.com", UserRole::Instructor).await;
    let category_id = category(&db, &admin, "Programming").await;
    let svc = catalog(&db);

    let course = svc
        .create_course(&owner, new_course(category_id, "Rust"))
        .await
        .unwrap();
    let second = svc
        .add_lesson(&owner, course.id, new_lesson("Ownership", 2))
        .await
        .unwrap();
    svc.add_lesson(&owner, course.id, new_lesson("Hello", 1))
        .await
        .unwrap();

    let err = svc
        .add_lesson(&rival, course.id, new_lesson("Spam", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::AuthorizationDenied { .. }));

    let detail = svc.get_course(course.id, true).await.unwrap();
    assert_eq!(detail.instructor_name, "Test owner");
    assert_eq!(detail.category_name, "Programming");
    let titles: Vec<String> = detail
        .lessons
        .unwrap()
        .into_iter()
        .map(|l| l.title)
        .collect();
    assert_eq!(titles, vec!["Hello", "Ownership"]);
    assert!(svc.get_course(course.id, false).await.unwrap().lessons.is_none());

    let renamed = svc
        .update_lesson(
            &admin,
            course.id,
            second.id,
            UpdateLesson {
                title: Some("Borrowing".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.title, "Borrowing");

    let err = svc
        .delete_lesson(&owner, Uuid::new_v4(), second.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::NotFound { .. }));

    svc.delete_lesson(&owner, course.id, second.id).await.unwrap();
    assert_eq!(svc.list_lessons(course.id).await.unwrap().len(), 1);

    assert!(matches!(
        svc.list_lessons(Uuid::new_v4()).await.unwrap_err(),
        LecternError::NotFound { .. }
    ));
}

#[tokio::test]
async fn course_listing_pages_and_filters() {
    let db = setup().await;
    let admin = register(&db, "root@example.com", UserRole::Admin).await;
    let owner = register(&db, "owner@example.com", UserRole::Instructor).await;
    let category_id = category(&db, &admin, "Programming").await;
    let svc = catalog(&db);

    for title in ["Rust", "Async Rust", "Go", "Zig", "C"] {
        svc.create_course(&owner, new_course(category_id, title))
            .await
            .unwrap();
    }

    let page = svc
        .list_courses(CourseFilter::default(), PageRequest::new(2, 2))
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.pages, 3);
    assert_eq!(page.page, 2);
    assert_eq!(page.items.len(), 2);

    let rust = svc
        .list_courses(
            CourseFilter {
                search: Some("rust".into()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(rust.total, 2);
    assert_eq!(rust.limit, 10);
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reviews_are_unique_and_author_owned() {
    let db = setup().await;
    let admin = register(&db, "root@example.com", UserRole::Admin).await;
    let owner = register(&db, "owner@example.com", UserRole::Instructor).await;
    let author = register(&db, "author@example.com", UserRole::Student).await;
    let other = register(&db, "other@example.com", UserRole::Student).await;
    let category_id = category(&db, &admin, "Programming").await;
    let course = catalog(&db)
        .create_course(&owner, new_course(category_id, "Rust"))
        .await
        .unwrap();

    let svc = ReviewService::new(
        SurrealReviewRepository::new(db.clone()),
        SurrealCourseRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
    );

    let err = svc
        .create_review(&author, course.id, 0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::Validation { .. }));

    let review = svc
        .create_review(&author, course.id, 4, Some("Great".into()))
        .await
        .unwrap();
    let err = svc
        .create_review(&author, course.id, 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::Conflict { .. }));

    let listing = svc.list_course_reviews(course.id).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].reviewer_name, "Test author");

    let change = UpdateReview {
        rating: Some(5),
        ..Default::default()
    };
    for intruder in [&other, &admin] {
        let err = svc
            .update_review(intruder, review.id, change.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, LecternError::AuthorizationDenied { .. }));
    }
    assert_eq!(
        svc.update_review(&author, review.id, change)
            .await
            .unwrap()
            .rating,
        5
    );

    let err = svc.delete_review(&other, review.id).await.unwrap_err();
    assert!(matches!(err, LecternError::AuthorizationDenied { .. }));
    svc.delete_review(&admin, review.id).await.unwrap();
    assert!(svc.list_course_reviews(course.id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[tokio::test]
async fn platform_stats_and_user_listing() {
    let db = setup().await;
    let admin = register(&db, "root@example.com", UserRole::Admin).await;
    let owner = register(&db, "owner@example.com", UserRole::Instructor).await;
    let s1 = register(&db, "s1@example.com", UserRole::Student).await;
    let s2 = register(&db, "s2@example.com", UserRole::Student).await;
    let category_id = category(&db, &admin, "Programming").await;
    let course = catalog(&db)
        .create_course(&owner, new_course(category_id, "Rust"))
        .await
        .unwrap();

    let enrollments = EnrollmentService::new(
        SurrealEnrollmentRepository::new(db.clone()),
        SurrealCourseRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
    );
    enrollments.enroll(&s1, course.id).await.unwrap();
    enrollments.enroll(&s2, course.id).await.unwrap();
    db.query("UPDATE enrollment SET status = 'cancelled' WHERE student_id = $id")
        .bind(("id", s2.user_id.to_string()))
        .await
        .unwrap()
        .check()
        .unwrap();

    let svc = AdminService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealCourseRepository::new(db.clone()),
        SurrealEnrollmentRepository::new(db.clone()),
        LearningConfig::default(),
    );

    let err = svc.stats(&owner).await.unwrap_err();
    assert!(matches!(err, LecternError::AuthorizationDenied { .. }));

    let stats = svc.stats(&admin).await.unwrap();
    assert_eq!(stats.total_users, 4);
    assert_eq!(stats.total_students, 2);
    assert_eq!(stats.total_instructors, 1);
    assert_eq!(stats.total_courses, 1);
    assert_eq!(stats.total_enrollments, 2);
    assert_eq!(stats.active_enrollments, 1);
    assert_eq!(stats.completion_rate, 50.0);

    let students = svc
        .list_users(&admin, Some(UserRole::Student), PageRequest::new(1, 1))
        .await
        .unwrap();
    assert_eq!(students.total, 2);
    assert_eq!(students.pages, 2);
    assert_eq!(students.items.len(), 1);

    let err = svc
        .list_users(&s1, None, PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::AuthorizationDenied { .. }));
}
