//! Presenter loop: advances the round timer and pushes overlay frames.

use std::time::{Duration, Instant};

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::{
    services::sse_events,
    state::{SharedState, engine::RoundSnapshot},
};

/// Run one frame per `frame_interval` until shutdown.
///
/// Each frame expires the round if its timer ran out and broadcasts the snapshot when it
/// differs from the previous frame. The engine lock is held only while copying state.
pub async fn run_display_loop(state: SharedState, frame_interval: Duration) {
    let mut shutdown = state.shutdown_watcher();
    let mut ticker = interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last: Option<RoundSnapshot> = None;

    info!(?frame_interval, "presenter loop started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }
        if *shutdown.borrow() {
            break;
        }

        if let Some(snapshot) = render_frame(&state, &mut last).await {
            sse_events::broadcast_round_snapshot(&state, snapshot);
        }
    }
    info!("presenter loop stopped");
}

/// Produce the snapshot to broadcast for this frame, or `None` if nothing changed.
async fn render_frame(
    state: &SharedState,
    last: &mut Option<RoundSnapshot>,
) -> Option<RoundSnapshot> {
    let now = Instant::now();
    let (expired, snapshot) = state
        .with_engine(|engine| (engine.tick(now), engine.snapshot(now)))
        .await;
    if expired {
        debug!(round_id = %snapshot.round_id, "round timer expired");
    }

    if last.as_ref() == Some(&snapshot) {
        return None;
    }
    *last = Some(snapshot.clone());
    Some(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::{round_service, test_support::pool_state},
        state::state_machine::RoundPhase,
    };

    #[tokio::test]
    async fn unchanged_frames_are_not_rebroadcast() {
        let (state, _outbox, _store) = pool_state();
        let mut last = None;

        let first = render_frame(&state, &mut last).await.unwrap();
        assert_eq!(first.phase, RoundPhase::Active);
        assert_eq!(last.as_ref(), Some(&first));

        round_service::stop_round(&state).await.unwrap();
        let stopped = render_frame(&state, &mut last).await.unwrap();
        assert_eq!(stopped.phase, RoundPhase::Inactive);
        assert!(render_frame(&state, &mut last).await.is_none());
    }

    #[tokio::test]
    async fn loop_exits_on_shutdown() {
        let (state, _outbox, _store) = pool_state();
        let mut receiver = state.overlay_sse().subscribe();
        let task = tokio::spawn(run_display_loop(state.clone(), Duration::from_millis(5)));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some(sse_events::EVENT_ROUND_SNAPSHOT));

        state.request_shutdown();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
