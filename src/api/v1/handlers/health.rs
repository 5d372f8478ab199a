/*
 * Responsibility
 * - GET /health (liveness, no auth)
 */
use axum::Json;
use chrono::Utc;

use crate::api::v1::dto::health::HealthResponse;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
