//! SurrealDB connection handling.
//!
//! The endpoint scheme selects the engine: `ws://`/`wss://` (or
//! `http://`/`https://`) reach a running server, `mem://` opens an
//! embedded in-memory store. Embedded stores have no root user, so
//! sign-in only happens against a server.

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::{debug, info};

use crate::error::DbError;

const REMOTE_SCHEMES: &[&str] = &["ws", "wss", "http", "https"];
const EMBEDDED_SCHEMES: &[&str] = &["mem"];

/// Root credentials for a SurrealDB server.
#[derive(Debug, Clone)]
pub struct RootCredentials {
    pub username: String,
    pub password: String,
}

/// Where Lectern keeps its data.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Endpoint such as `ws://127.0.0.1:8000` or `mem://`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Used only for server endpoints.
    pub credentials: Option<RootCredentials>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000".into(),
            namespace: "lectern".into(),
            database: "main".into(),
            credentials: Some(RootCredentials {
                username: "root".into(),
                password: "root".into(),
            }),
        }
    }
}

impl DbConfig {
    /// An embedded store that lives as long as the process.
    pub fn in_memory() -> Self {
        Self {
            url: "mem://".into(),
            credentials: None,
            ..Self::default()
        }
    }

    fn scheme(&self) -> Result<&str, DbError> {
        let scheme = self
            .url
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .ok_or_else(|| DbError::Endpoint(format!("missing scheme in `{}`", self.url)))?;

        if REMOTE_SCHEMES.contains(&scheme) || EMBEDDED_SCHEMES.contains(&scheme) {
            Ok(scheme)
        } else {
            Err(DbError::Endpoint(format!(
                "unsupported scheme `{scheme}` in `{}`",
                self.url
            )))
        }
    }

    /// True when the endpoint is an in-process engine.
    pub fn is_embedded(&self) -> Result<bool, DbError> {
        Ok(EMBEDDED_SCHEMES.contains(&self.scheme()?))
    }
}

/// An open handle on the configured namespace and database.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Any>,
}

impl DbManager {
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let embedded = config.is_embedded()?;
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            embedded,
            "Opening SurrealDB"
        );

        let db = any::connect(config.url.as_str()).await?;

        match (&config.credentials, embedded) {
            (Some(creds), false) => {
                db.signin(Root {
                    username: creds.username.clone(),
                    password: creds.password.clone(),
                })
                .await?;
                debug!(username = %creds.username, "Signed in as root");
            }
            (None, false) => debug!("No credentials configured, connecting anonymously"),
            (_, true) => {}
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_decides_engine() {
        assert!(!DbConfig::default().is_embedded().unwrap());
        assert!(DbConfig::in_memory().is_embedded().unwrap());
    }

    #[test]
    fn unknown_or_missing_scheme_is_rejected() {
        for url in ["127.0.0.1:8000", "rocksdb://data", "ftp://host"] {
            let config = DbConfig {
                url: url.into(),
                ..DbConfig::default()
            };
            assert!(
                matches!(config.is_embedded(), Err(DbError::Endpoint(_))),
                "{url} should be rejected"
            );
        }
    }
}
