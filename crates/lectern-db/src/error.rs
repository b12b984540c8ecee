//! Database-specific error types and conversions.

use lectern_core::error::LecternError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Invalid endpoint: {0}")]
    Endpoint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Field constraint violated: {0}")]
    Constraint(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate {entity}: {detail}")]
    Conflict { entity: String, detail: String },
}

impl DbError {
    /// Classify a failed write against `entity`.
    ///
    /// Unique index hits and write/write transaction conflicts become
    /// [`DbError::Conflict`]; `ASSERT` failures become
    /// [`DbError::Constraint`].
    pub(crate) fn statement(entity: &str, err: surrealdb::Error) -> Self {
        let detail = err.to_string();
        let lowered = detail.to_lowercase();
        if lowered.contains("already contains")
            || lowered.contains("already exists")
            || lowered.contains("conflict")
        {
            DbError::Conflict {
                entity: entity.into(),
                detail,
            }
        } else if lowered.contains("must conform to") {
            DbError::Constraint(detail)
        } else {
            DbError::Query(detail)
        }
    }

    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for LecternError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LecternError::NotFound { entity, id },
            DbError::Conflict { entity, .. } => LecternError::Conflict {
                reason: format!("{entity} already exists"),
            },
            DbError::Constraint(message) => LecternError::Validation { message },
            other => LecternError::Database(other.to_string()),
        }
    }
}
