//! Shared application state handed to every request handler.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::AppConfig;

pub type SharedState = Arc<AppState>;

/// Central application state. The database pool is the only shared mutable
/// resource; all game state lives in PostgreSQL.
pub struct AppState {
    pool: PgPool,
}

impl AppState {
    /// Connect the pool and wrap the state in an [`Arc`] so it can be cloned
    /// cheaply into handlers and background tasks.
    pub async fn connect(config: &AppConfig) -> Result<SharedState, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(&config.database_url)
            .await?;

        info!("connected to PostgreSQL");
        Ok(Arc::new(Self { pool }))
    }

    /// Build the state from an already connected pool (used by tests).
    pub fn from_pool(pool: PgPool) -> SharedState {
        Arc::new(Self { pool })
    }

    /// Handle to the connection pool.
    pub fn db(&self) -> &PgPool {
        &self.pool
    }
}
