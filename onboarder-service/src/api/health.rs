//! Health Check API Handler
//!
//! Liveness only: the scheduler is not probed, so a healthy response says
//! nothing about whether submissions will succeed.

use axum::Json;
use onboarder_core::dto::submission::HealthStatus;

/// GET /health
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
