//! Integration tests for the User repository using in-memory SurrealDB.

use lectern_core::error::LecternError;
use lectern_core::models::user::{CreateUser, UpdateUser, UserRole, UserStatus};
use lectern_core::repository::{Pagination, UserRepository};
use lectern_db::repository::SurrealUserRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lectern_db::run_migrations(&db).await.unwrap();
    db
}

fn new_user(email: &str, role: UserRole) -> CreateUser {
    CreateUser {
        email: email.into(),
        password: "SuperSecret123!".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        bio: None,
        role,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let repo = SurrealUserRepository::new(setup().await);

    let user = repo
        .create(new_user("ada@example.com", UserRole::Student))
        .await
        .unwrap();

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.role, UserRole::Student);
    assert_eq!(user.status, UserStatus::Active);
    assert_eq!(user.full_name(), "Ada Lovelace");
    assert_ne!(user.password_hash, "SuperSecret123!");
    assert!(user.password_hash.starts_with("$argon2id$"));

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);

    let by_email = repo.get_by_email("ada@example.com").await.unwrap();
    assert_eq!(by_email.id, user.id);
}

#[tokio::test]
async fn password_hash_uses_owasp_parameters() {
    let repo = SurrealUserRepository::new(setup().await);
    let first = repo
        .create(new_user("grace@example.com", UserRole::Instructor))
        .await
        .unwrap();
    let second = repo
        .create(new_user("hopper@example.com", UserRole::Instructor))
        .await
        .unwrap();

    assert!(
        first
            .password_hash
            .starts_with("$argon2id$v=19$m=19456,t=2,p=1$")
    );
    // Same password, fresh salt.
    assert_ne!(first.password_hash, second.password_hash);
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let repo = SurrealUserRepository::new(setup().await);

    let err = repo.get_by_id(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, LecternError::NotFound { .. }));

    let err = repo.get_by_email("nobody@example.com").await.unwrap_err();
    assert!(matches!(err, LecternError::NotFound { .. }));
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let repo = SurrealUserRepository::new(setup().await);
    repo.create(new_user("dup@example.com", UserRole::Student))
        .await
        .unwrap();

    let err = repo
        .create(new_user("dup@example.com", UserRole::Student))
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::Conflict { .. }), "got {err:?}");
}

#[tokio::test]
async fn update_user() {
    let repo = SurrealUserRepository::new(setup().await);
    let user = repo
        .create(CreateUser {
            bio: Some("hello".into()),
            ..new_user("linus@example.com", UserRole::Student)
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                first_name: Some("Linus".into()),
                bio: Some(None),
                status: Some(UserStatus::Suspended),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Linus");
    assert_eq!(updated.last_name, "Lovelace"); // unchanged
    assert_eq!(updated.bio, None);
    assert_eq!(updated.status, UserStatus::Suspended);
}

#[tokio::test]
async fn list_and_count_by_role() {
    let repo = SurrealUserRepository::new(setup().await);
    for i in 0..3 {
        repo.create(new_user(&format!("s{i}@example.com"), UserRole::Student))
            .await
            .unwrap();
    }
    repo.create(new_user("t@example.com", UserRole::Instructor))
        .await
        .unwrap();

    assert_eq!(repo.count(None).await.unwrap(), 4);
    assert_eq!(repo.count(Some(UserRole::Student)).await.unwrap(), 3);
    assert_eq!(repo.count(Some(UserRole::Admin)).await.unwrap(), 0);

    let page = repo
        .list(
            Some(UserRole::Student),
            Pagination {
                offset: 0,
                limit: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 3);
    assert!(page.items.iter().all(|u| u.role == UserRole::Student));

    let page2 = repo
        .list(
            Some(UserRole::Student),
            Pagination {
                offset: 2,
                limit: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page2.items.len(), 1);
}
