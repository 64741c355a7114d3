use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};

use crate::dtos::HealthResponse;
use crate::startup::AppState;

/// Liveness only: reports how long the process has been up. The database
/// is not consulted, so this stays `healthy` while MongoDB is unreachable.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    tracing::info!("Health check endpoint called");
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}
