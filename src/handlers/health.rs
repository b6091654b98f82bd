//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;
use crate::state::AppState;

/// Public health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    /// Status indicator (always "ok")
    pub status: String,
    /// Number of session actors currently alive
    pub active_sessions: usize,
}

/// Public health check handler
///
/// # Example
/// ```bash
/// curl http://localhost:8787/api/v1/health
/// # Returns: {"status":"ok","active_sessions":0}
/// ```
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    tracing::debug!("Health check requested");
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        active_sessions: state.sessions.len(),
    })
}
