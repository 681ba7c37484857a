use tracing::warn;

use crate::dto::health::HealthResponse;
use crate::state::SharedState;

/// Ping the database and report ok/degraded accordingly.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match sqlx::query("SELECT 1").execute(state.db()).await {
        Ok(_) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "database health check failed");
            HealthResponse::degraded()
        }
    }
}
