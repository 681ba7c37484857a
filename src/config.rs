//! Application-level configuration loaded from the environment.

use std::env;

use anyhow::Context;

/// Default port the HTTP server binds to when none is configured.
const DEFAULT_PORT: u16 = 8000;
/// Default size of the PostgreSQL connection pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Upper bound on pooled database connections.
    pub max_connections: u32,
}

impl AppConfig {
    /// Load the configuration from the environment.
    ///
    /// `DATABASE_URL` is required; `PORT` (or `SERVER_PORT`) and
    /// `DATABASE_MAX_CONNECTIONS` fall back to built-in defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set to a PostgreSQL URL")?;

        let port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        Ok(Self {
            database_url,
            port,
            max_connections,
        })
    }
}
