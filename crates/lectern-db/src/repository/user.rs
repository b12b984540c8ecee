//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use lectern_core::error::LecternResult;
use lectern_core::models::user::{CreateUser, UpdateUser, User, UserRole};
use lectern_core::repository::{PaginatedResult, Pagination, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::support::{CountRow, first_count, parse_enum, parse_uuid, single};
use crate::error::DbError;

const SELECT_USER: &str = "SELECT meta::id(id) AS record_id, * FROM type::record('user', $id)";

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    bio: Option<String>,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid("user", &self.record_id)?,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: parse_enum(&self.role)?,
            status: parse_enum(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
fn hash_password(password: &str) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Hash(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> LecternResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let password_hash = hash_password(&input.password)?;

        let query = format!(
            "CREATE type::record('user', $id) SET \
             email = $email, password_hash = $password_hash, \
             first_name = $first_name, last_name = $last_name, \
             bio = $bio, role = $role, status = 'active'; \
             {SELECT_USER};"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("password_hash", password_hash))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("bio", input.bio))
            .bind(("role", input.role.as_str().to_string()))
            .await
            .map_err(|e| DbError::statement("user", e))?
            .check()
            .map_err(|e| DbError::statement("user", e))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let user = single(rows, "user", id_str)?.try_into_user()?;
        debug!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> LecternResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_USER)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, "user", id_str)?.try_into_user()?)
    }

    async fn get_by_email(&self, email: &str) -> LecternResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, "user", format!("email={email}"))?.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> LecternResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.bio.is_some() {
            sets.push("bio = $bio");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}; {SELECT_USER};",
            sets.join(", ")
        );

        let mut builder = self.db.query(query).bind(("id", id_str.clone()));

        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(bio) = input.bio {
            // Some(None) clears the bio.
            builder = builder.bind(("bio", bio));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }

        let mut result = builder
            .await
            .map_err(|e| DbError::statement("user", e))?
            .check()
            .map_err(|e| DbError::statement("user", e))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, "user", id_str)?.try_into_user()?)
    }

    async fn list(
        &self,
        role: Option<UserRole>,
        pagination: Pagination,
    ) -> LecternResult<PaginatedResult<User>> {
        let filter = if role.is_some() {
            "WHERE role = $role"
        } else {
            ""
        };
        let role_str = role.map(|r| r.as_str().to_string());

        let query = format!(
            "SELECT count() AS total FROM user {filter} GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM user {filter} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset;"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("role", role_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: first_count(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn count(&self, role: Option<UserRole>) -> LecternResult<u64> {
        let query = match role {
            Some(_) => "SELECT count() AS total FROM user WHERE role = $role GROUP ALL",
            None => "SELECT count() AS total FROM user GROUP ALL",
        };

        let mut result = self
            .db
            .query(query)
            .bind(("role", role.map(|r| r.as_str().to_string())))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_count(rows))
    }
}
