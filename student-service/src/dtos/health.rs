use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339, UTC, millisecond precision.
    pub timestamp: String,
    /// Seconds since the service started.
    pub uptime: f64,
}
