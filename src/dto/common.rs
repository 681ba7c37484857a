use serde::Serialize;
use utoipa::ToSchema;

/// Plain acknowledgement body returned by host-driven mutations.
#[derive(Debug, Serialize, ToSchema)]
pub struct OkResponse {
    /// Always "ok".
    pub status: String,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
