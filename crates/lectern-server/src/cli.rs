//! Command-line and environment configuration.

use clap::{Args, Parser, Subcommand};
use lectern_db::{DbConfig, RootCredentials};
use lectern_learning::LearningConfig;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "lectern", version)]
#[command(about = "E-learning backend core: migrations, demo data and reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub db: DbArgs,

    #[command(flatten)]
    pub learning: LearningArgs,

    /// Default tracing filter when RUST_LOG is unset
    #[arg(long, env = "LECTERN_LOG", default_value = "lectern=info")]
    pub log: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply pending schema migrations and exit (the default)
    Migrate,
    /// Populate an empty database with demo accounts, a course and progress
    Seed,
    /// Print platform statistics as a JSON envelope
    Stats(Credentials),
    /// Print the completion roster of one course as a JSON envelope
    Roster {
        #[command(flatten)]
        credentials: Credentials,

        /// Course to report on
        #[arg(long)]
        course: Uuid,
    },
}

#[derive(Args, Debug, Clone)]
pub struct Credentials {
    /// Account email
    #[arg(long, env = "LECTERN_EMAIL")]
    pub email: String,

    /// Account password
    #[arg(long, env = "LECTERN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// SurrealDB endpoint: `ws://host:port` for a server, `mem://` for a
    /// throwaway in-process store
    #[arg(long = "db-url", env = "LECTERN_DB_URL", default_value = "ws://127.0.0.1:8000")]
    pub url: String,

    /// SurrealDB namespace
    #[arg(long = "db-namespace", env = "LECTERN_DB_NAMESPACE", default_value = "lectern")]
    pub namespace: String,

    /// SurrealDB database
    #[arg(long = "db-name", env = "LECTERN_DB_NAME", default_value = "main")]
    pub database: String,

    /// Root user; omit for an unauthenticated server
    #[arg(long = "db-user", env = "LECTERN_DB_USER")]
    pub username: Option<String>,

    /// Root password
    #[arg(
        long = "db-password",
        env = "LECTERN_DB_PASSWORD",
        requires = "username",
        hide_env_values = true
    )]
    pub password: Option<String>,
}

impl From<DbArgs> for DbConfig {
    fn from(args: DbArgs) -> Self {
        Self {
            url: args.url,
            namespace: args.namespace,
            database: args.database,
            credentials: args.username.map(|username| RootCredentials {
                username,
                password: args.password.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct LearningArgs {
    /// Page size used when a listing does not specify one
    #[arg(long, env = "LECTERN_DEFAULT_PAGE_SIZE", default_value_t = 10)]
    pub default_page_size: u64,

    /// Largest page size a listing may request
    #[arg(long, env = "LECTERN_MAX_PAGE_SIZE", default_value_t = 100)]
    pub max_page_size: u64,
}

impl From<LearningArgs> for LearningConfig {
    fn from(args: LearningArgs) -> Self {
        Self {
            default_page_size: args.default_page_size,
            max_page_size: args.max_page_size,
        }
    }
}
