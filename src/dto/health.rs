use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether the chat bridge is currently joined to its channel.
    pub chat_connected: bool,
    /// Whether the last leaderboard award reached disk.
    pub leaderboard_persisted: bool,
}

impl HealthResponse {
    /// Build the response; degraded whenever the leaderboard could not be persisted.
    pub fn new(chat_connected: bool, leaderboard_persisted: bool) -> Self {
        let status = if leaderboard_persisted { "ok" } else { "degraded" };
        Self {
            status: status.to_string(),
            chat_connected,
            leaderboard_persisted,
        }
    }
}
