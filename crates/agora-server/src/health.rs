//! Liveness endpoint.

use serde::Serialize;

/// Body of `GET /health`.
#[derive(Clone, Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: &'static str,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Number of live chat sessions.
    pub active_sessions: usize,
}

impl HealthResponse {
    /// Build the current health snapshot.
    #[must_use]
    pub fn new(uptime_secs: u64, active_sessions: usize) -> Self {
        Self {
            status: "ok",
            uptime_secs,
            active_sessions,
        }
    }
}
