//! Lectern: application entry point.

mod cli;
mod seed;

use anyhow::Context;
use clap::Parser;
use lectern_core::envelope::Envelope;
use lectern_core::error::LecternResult;
use lectern_db::repository::{
    SurrealCourseRepository, SurrealEnrollmentRepository, SurrealLessonRepository,
    SurrealProgressRepository, SurrealUserRepository,
};
use lectern_db::{DbConfig, DbManager};
use lectern_learning::{AccountService, AdminService, AnalyticsService, LearningConfig};
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, Credentials};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; a malformed one is not.
    match dotenvy::dotenv() {
        Ok(_) | Err(dotenvy::Error::Io(_)) => {}
        Err(e) => return Err(e).context("failed to load .env"),
    }

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    tracing::info!("Starting Lectern...");

    let db_config = DbConfig::from(cli.db);
    let learning_config = LearningConfig::from(cli.learning);

    let manager = DbManager::connect(&db_config)
        .await
        .context("failed to connect to SurrealDB")?;
    let db = manager.client().clone();

    let applied = lectern_db::run_migrations(&db)
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, "Schema ready");

    match cli.command.unwrap_or(Command::Migrate) {
        Command::Migrate => {}
        Command::Seed => seed::run(&db, learning_config).await?,
        Command::Stats(credentials) => {
            let result = stats(&db, &credentials, learning_config).await;
            print_envelope(result)?;
        }
        Command::Roster {
            credentials,
            course,
        } => {
            let result = roster(&db, &credentials, course).await;
            print_envelope(result)?;
        }
    }

    tracing::info!("Lectern stopped.");
    Ok(())
}

async fn stats(
    db: &Surreal<Any>,
    credentials: &Credentials,
    config: LearningConfig,
) -> LecternResult<lectern_learning::admin::PlatformStats> {
    let principal = AccountService::new(SurrealUserRepository::new(db.clone()))
        .authenticate(&credentials.email, &credentials.password)
        .await?;

    AdminService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealCourseRepository::new(db.clone()),
        SurrealEnrollmentRepository::new(db.clone()),
        config,
    )
    .stats(&principal)
    .await
}

async fn roster(
    db: &Surreal<Any>,
    credentials: &Credentials,
    course_id: uuid::Uuid,
) -> LecternResult<Vec<lectern_learning::analytics::StudentProgressSummary>> {
    let principal = AccountService::new(SurrealUserRepository::new(db.clone()))
        .authenticate(&credentials.email, &credentials.password)
        .await?;

    AnalyticsService::new(
        SurrealCourseRepository::new(db.clone()),
        SurrealEnrollmentRepository::new(db.clone()),
        SurrealLessonRepository::new(db.clone()),
        SurrealProgressRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
    )
    .instructor_roster(course_id, &principal)
    .await
}

fn print_envelope<T: Serialize>(result: LecternResult<T>) -> anyhow::Result<()> {
    if let Err(err) = &result {
        tracing::warn!(error = %err, status = err.status_code(), "Report failed");
    }
    let envelope = Envelope::from(result);
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    if envelope.success {
        Ok(())
    } else {
        anyhow::bail!("request failed with status {}", envelope.status())
    }
}
