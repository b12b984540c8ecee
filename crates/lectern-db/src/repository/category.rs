//! SurrealDB implementation of [`CategoryRepository`].

use chrono::{DateTime, Utc};
use lectern_core::error::LecternResult;
use lectern_core::models::category::{Category, CreateCategory, UpdateCategory};
use lectern_core::repository::CategoryRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::support::{parse_uuid, single};
use crate::error::DbError;

const SELECT_CATEGORY: &str =
    "SELECT meta::id(id) AS record_id, * FROM type::record('category', $id)";

#[derive(Debug, SurrealValue)]
struct CategoryRow {
    record_id: String,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRow {
    fn try_into_category(self) -> Result<Category, DbError> {
        Ok(Category {
            id: parse_uuid("category", &self.record_id)?,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Category repository.
#[derive(Clone)]
pub struct SurrealCategoryRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCategoryRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CategoryRepository for SurrealCategoryRepository<C> {
    async fn create(&self, input: CreateCategory) -> LecternResult<Category> {
        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(format!(
                "CREATE type::record('category', $id) SET \
                 name = $name, description = $description; \
                 {SELECT_CATEGORY};"
            ))
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .await
            .map_err(|e| DbError::statement("category", e))?
            .check()
            .map_err(|e| DbError::statement("category", e))?;

        let rows: Vec<CategoryRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, "category", id_str)?.try_into_category()?)
    }

    async fn get_by_id(&self, id: Uuid) -> LecternResult<Category> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_CATEGORY)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, "category", id_str)?.try_into_category()?)
    }

    async fn update(&self, id: Uuid, input: UpdateCategory) -> LecternResult<Category> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('category', $id) SET {}; {SELECT_CATEGORY};",
            sets.join(", ")
        );

        let mut builder = self.db.query(query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }

        let mut result = builder
            .await
            .map_err(|e| DbError::statement("category", e))?
            .check()
            .map_err(|e| DbError::statement("category", e))?;

        let rows: Vec<CategoryRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, "category", id_str)?.try_into_category()?)
    }

    async fn delete(&self, id: Uuid) -> LecternResult<()> {
        self.db
            .query("DELETE type::record('category', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("category", e))?;

        Ok(())
    }

    async fn list(&self) -> LecternResult<Vec<Category>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM category ORDER BY name ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let categories = rows
            .into_iter()
            .map(|row| row.try_into_category())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(categories)
    }
}
