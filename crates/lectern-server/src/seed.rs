//! Demo data for a fresh database, created through the services so the
//! usual checks apply.

use anyhow::Context;
use lectern_core::error::LecternError;
use lectern_core::models::category::CreateCategory;
use lectern_core::models::course::CourseStatus;
use lectern_core::models::lesson::LessonType;
use lectern_core::models::principal::Principal;
use lectern_core::models::user::UserRole;
use lectern_db::repository::{
    SurrealCategoryRepository, SurrealCourseRepository, SurrealEnrollmentRepository,
    SurrealLessonRepository, SurrealProgressRepository, SurrealUserRepository,
};
use lectern_learning::account::NewAccount;
use lectern_learning::catalog::{NewCourse, NewLesson};
use lectern_learning::progress::ProgressUpdate;
use lectern_learning::{
    AccountService, CatalogService, EnrollmentService, LearningConfig, ProgressService,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tracing::{info, warn};

const DEMO_PASSWORD: &str = "lectern-demo-password";

async fn account(
    accounts: &AccountService<SurrealUserRepository<Any>>,
    email: &str,
    first_name: &str,
    role: UserRole,
) -> anyhow::Result<Principal> {
    let user = accounts
        .register(NewAccount {
            email: email.into(),
            password: DEMO_PASSWORD.into(),
            first_name: first_name.into(),
            last_name: "Demo".into(),
            role: Some(role),
        })
        .await
        .with_context(|| format!("failed to register {email}"))?;
    Ok(Principal::from(&user))
}

pub async fn run(db: &Surreal<Any>, config: LearningConfig) -> anyhow::Result<()> {
    let accounts = AccountService::new(SurrealUserRepository::new(db.clone()));

    let admin = match accounts
        .register(NewAccount {
            email: "admin@lectern.dev".into(),
            password: DEMO_PASSWORD.into(),
            first_name: "Ada".into(),
            last_name: "Demo".into(),
            role: Some(UserRole::Admin),
        })
        .await
    {
        Ok(user) => Principal::from(&user),
        Err(LecternError::Conflict { .. }) => {
            warn!("Demo data already present, skipping seed");
            return Ok(());
        }
        Err(e) => return Err(e).context("failed to register admin"),
    };
    let instructor = account(&accounts, "instructor@lectern.dev", "Ines", UserRole::Instructor).await?;
    let student = account(&accounts, "student@lectern.dev", "Sam", UserRole::Student).await?;

    let catalog = CatalogService::new(
        SurrealCourseRepository::new(db.clone()),
        SurrealLessonRepository::new(db.clone()),
        SurrealCategoryRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        config,
    );
    let category = catalog
        .create_category(
            &admin,
            CreateCategory {
                name: "Programming".into(),
                description: Some("Software development".into()),
            },
        )
        .await?;
    let course = catalog
        .create_course(
            &instructor,
            NewCourse {
                category_id: category.id,
                title: "Rust from Scratch".into(),
                description: "Ownership, traits and async in practice".into(),
                price: 0.0,
                status: Some(CourseStatus::Published),
                level: Some("beginner".into()),
                language: Some("en".into()),
                duration: Some(180),
            },
        )
        .await?;

    let mut lessons = Vec::new();
    for (position, (title, lesson_type)) in [
        ("Installing the toolchain", LessonType::Video),
        ("Ownership and borrowing", LessonType::Text),
        ("Checkpoint quiz", LessonType::Quiz),
    ]
    .into_iter()
    .enumerate()
    {
        let lesson = catalog
            .add_lesson(
                &instructor,
                course.id,
                NewLesson {
                    title: title.into(),
                    description: None,
                    content: format!("{title}."),
                    position: position as u32 + 1,
                    lesson_type,
                    duration: Some(15),
                    video_url: None,
                },
            )
            .await?;
        lessons.push(lesson);
    }

    EnrollmentService::new(
        SurrealEnrollmentRepository::new(db.clone()),
        SurrealCourseRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
    )
    .enroll(&student, course.id)
    .await?;

    if let Some(first) = lessons.first() {
        ProgressService::new(
            SurrealProgressRepository::new(db.clone()),
            SurrealEnrollmentRepository::new(db.clone()),
            SurrealLessonRepository::new(db.clone()),
            SurrealCourseRepository::new(db.clone()),
        )
        .upsert_progress(
            &student,
            course.id,
            first.id,
            ProgressUpdate {
                is_completed: true,
                time_spent: Some(900),
                score: None,
            },
        )
        .await?;
    }

    info!(
        course_id = %course.id,
        lessons = lessons.len(),
        "Demo data seeded"
    );
    Ok(())
}
