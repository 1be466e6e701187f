//! Health and diagnostics endpoints.

use axum::Json;
use linkarr_telemetry::build_sha;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) build: &'static str,
}

/// Liveness probe reporting the running build.
pub(crate) async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        build: build_sha(),
    })
}
