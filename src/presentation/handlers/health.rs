use axum::Json;
use serde::Serialize;

const HEALTHY: &str = "healthy";

/// Liveness only; an unconfigured model backend still reports healthy.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: HEALTHY })
}
