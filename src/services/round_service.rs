//! Round control and read-only views used by the HTTP surface.
//!
//! Overlays pick up the resulting changes on the next presenter frame.

use std::time::Instant;

use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{overlay::LeaderboardEntryDto, public::LeaderboardResponse},
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        engine::RoundSnapshot,
        state_machine::{StartTrigger, StopReason},
    },
};

/// Force-start a new round from the presenter, replacing any running one.
pub async fn start_round(state: &SharedState) -> Result<Uuid, ServiceError> {
    let now = Instant::now();
    let round_id = state
        .with_engine(|engine| engine.start(StartTrigger::Presenter, now))
        .await?;
    Ok(round_id)
}

/// Stop the running round from the presenter.
pub async fn stop_round(state: &SharedState) -> Result<(), ServiceError> {
    state
        .with_engine(|engine| engine.stop(StopReason::Presenter))
        .await?;
    Ok(())
}

/// Ask every loop to wind down; the server exits after in-flight requests finish.
pub fn quit(state: &SharedState) {
    info!("quit requested by presenter");
    sse_events::broadcast_info(state, "Shutting down");
    state.request_shutdown();
}

/// Current overlay frame.
pub async fn snapshot(state: &SharedState) -> RoundSnapshot {
    let now = Instant::now();
    state.with_engine(|engine| engine.snapshot(now)).await
}

/// Top of the leaderboard, as answered to `!leaderboard`.
pub async fn leaderboard(state: &SharedState) -> LeaderboardResponse {
    let entries = state
        .with_engine(|engine| engine.leaderboard_query())
        .await
        .into_iter()
        .map(LeaderboardEntryDto::from)
        .collect();
    LeaderboardResponse { entries }
}
