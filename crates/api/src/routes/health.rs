//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health — answers as long as the server accepts requests.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
