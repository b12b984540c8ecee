//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings; enums are stored as lowercase strings guarded by ASSERT
//! constraints. Uniqueness that the services rely on (one enrollment
//! per student and course, one progress row per lesson, one review per
//! student and course) is enforced by UNIQUE indexes so that racing
//! writers lose with an index violation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD first_name ON TABLE user TYPE string;
DEFINE FIELD last_name ON TABLE user TYPE string;
DEFINE FIELD bio ON TABLE user TYPE option<string>;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['student', 'instructor', 'admin'];
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['active', 'inactive', 'suspended'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_role ON TABLE user COLUMNS role;

-- =======================================================================
-- Categories
-- =======================================================================
DEFINE TABLE category SCHEMAFULL;
DEFINE FIELD name ON TABLE category TYPE string;
DEFINE FIELD description ON TABLE category TYPE option<string>;
DEFINE FIELD created_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_category_name ON TABLE category COLUMNS name UNIQUE;

-- =======================================================================
-- Courses
-- =======================================================================
DEFINE TABLE course SCHEMAFULL;
DEFINE FIELD instructor_id ON TABLE course TYPE string;
DEFINE FIELD category_id ON TABLE course TYPE string;
DEFINE FIELD title ON TABLE course TYPE string \
    ASSERT string::len($value) >= 1 AND string::len($value) <= 200;
DEFINE FIELD description ON TABLE course TYPE string;
DEFINE FIELD price ON TABLE course TYPE float ASSERT $value >= 0;
DEFINE FIELD status ON TABLE course TYPE string \
    ASSERT $value IN ['draft', 'published', 'archived'];
DEFINE FIELD level ON TABLE course TYPE option<string>;
DEFINE FIELD language ON TABLE course TYPE option<string>;
DEFINE FIELD duration ON TABLE course TYPE option<int>;
DEFINE FIELD created_at ON TABLE course TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE course TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_course_instructor ON TABLE course COLUMNS instructor_id;
DEFINE INDEX idx_course_category ON TABLE course COLUMNS category_id;

-- =======================================================================
-- Lessons (owned through course)
-- =======================================================================
DEFINE TABLE lesson SCHEMAFULL;
DEFINE FIELD course_id ON TABLE lesson TYPE string;
DEFINE FIELD title ON TABLE lesson TYPE string;
DEFINE FIELD description ON TABLE lesson TYPE option<string>;
DEFINE FIELD content ON TABLE lesson TYPE string;
DEFINE FIELD position ON TABLE lesson TYPE int ASSERT $value >= 0;
DEFINE FIELD lesson_type ON TABLE lesson TYPE string \
    ASSERT $value IN ['video', 'text', 'quiz', 'assignment'];
DEFINE FIELD duration ON TABLE lesson TYPE option<int>;
DEFINE FIELD video_url ON TABLE lesson TYPE option<string>;
DEFINE FIELD created_at ON TABLE lesson TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE lesson TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_lesson_course_position ON TABLE lesson \
    COLUMNS course_id, position;

-- =======================================================================
-- Enrollments
-- =======================================================================
DEFINE TABLE enrollment SCHEMAFULL;
DEFINE FIELD student_id ON TABLE enrollment TYPE string;
DEFINE FIELD course_id ON TABLE enrollment TYPE string;
DEFINE FIELD status ON TABLE enrollment TYPE string \
    ASSERT $value IN ['active', 'completed', 'cancelled'];
DEFINE FIELD enrolled_at ON TABLE enrollment TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD completed_at ON TABLE enrollment TYPE option<datetime>;
DEFINE FIELD updated_at ON TABLE enrollment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_enrollment_student_course ON TABLE enrollment \
    COLUMNS student_id, course_id UNIQUE;
DEFINE INDEX idx_enrollment_course ON TABLE enrollment \
    COLUMNS course_id;

-- =======================================================================
-- Progress (per student, course, lesson)
-- =======================================================================
DEFINE TABLE progress SCHEMAFULL;
DEFINE FIELD student_id ON TABLE progress TYPE string;
DEFINE FIELD course_id ON TABLE progress TYPE string;
DEFINE FIELD lesson_id ON TABLE progress TYPE string;
DEFINE FIELD is_completed ON TABLE progress TYPE bool DEFAULT false;
DEFINE FIELD completed_at ON TABLE progress TYPE option<datetime>;
DEFINE FIELD time_spent ON TABLE progress TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
DEFINE FIELD score ON TABLE progress TYPE option<int> \
    ASSERT $value = NONE OR ($value >= 0 AND $value <= 100);
DEFINE FIELD created_at ON TABLE progress TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE progress TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_progress_student_course_lesson ON TABLE progress \
    COLUMNS student_id, course_id, lesson_id UNIQUE;

-- =======================================================================
-- Reviews
-- =======================================================================
DEFINE TABLE review SCHEMAFULL;
DEFINE FIELD student_id ON TABLE review TYPE string;
DEFINE FIELD course_id ON TABLE review TYPE string;
DEFINE FIELD rating ON TABLE review TYPE int \
    ASSERT $value >= 1 AND $value <= 5;
DEFINE FIELD comment ON TABLE review TYPE option<string> \
    ASSERT $value = NONE OR string::len($value) <= 1000;
DEFINE FIELD created_at ON TABLE review TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE review TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_review_student_course ON TABLE review \
    COLUMNS student_id, course_id UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Bring the schema up to date and return how many migrations ran.
///
/// Each pending migration runs in one transaction together with its
/// `_migration` row, so a failed step leaves no trace and is retried on
/// the next start.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<usize, DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version, name FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let applied: Vec<MigrationRecord> = result.take(0)?;
    let current = applied.first().map_or(0, |m| m.version);

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        if let Some(latest) = applied.first() {
            debug!(version = latest.version, name = %latest.name, "Schema is current");
        }
        return Ok(0);
    }

    for migration in &pending {
        info!(
            from = current,
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        db.query(format!(
            "BEGIN TRANSACTION; {} CREATE _migration SET version = $version, \
             name = $name; COMMIT TRANSACTION;",
            migration.sql
        ))
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!("v{} ({}): {e}", migration.version, migration.name))
        })?;
    }

    Ok(pending.len())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn uniqueness_is_declared_for_learning_records() {
        for index in [
            "idx_enrollment_student_course",
            "idx_progress_student_course_lesson",
            "idx_review_student_course",
            "idx_user_email",
        ] {
            let line = SCHEMA_V1
                .lines()
                .position(|l| l.contains(index))
                .unwrap_or_else(|| panic!("missing index {index}"));
            let decl: String = SCHEMA_V1.lines().skip(line).take(2).collect();
            assert!(decl.contains("UNIQUE"), "{index} must be UNIQUE");
        }
    }
}
