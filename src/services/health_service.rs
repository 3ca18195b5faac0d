use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report chat connectivity and whether the leaderboard reached disk.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let persisted = state
        .with_engine(|engine| !engine.leaderboard().is_dirty())
        .await;
    if !persisted {
        warn!("leaderboard has unsaved awards (degraded mode)");
    }

    HealthResponse::new(state.is_chat_connected(), persisted)
}
