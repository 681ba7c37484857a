use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" when the database answers, "degraded" otherwise.
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
        }
    }
}
