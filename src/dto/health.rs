use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `"ok"` when session storage is reachable, `"degraded"` otherwise.
    pub status: String,
}

impl HealthResponse {
    /// Health response for a backend with working session storage.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    /// Health response for a backend running without session storage.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
        }
    }
}
