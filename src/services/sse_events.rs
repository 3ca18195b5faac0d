use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{overlay::OverlaySnapshot, sse::ServerEvent},
    state::{SharedState, engine::RoundSnapshot},
};

/// Event name carried by every overlay frame.
pub const EVENT_ROUND_SNAPSHOT: &str = "round.snapshot";
const EVENT_INFO: &str = "info";

/// Broadcast a full overlay frame to every overlay subscriber.
pub fn broadcast_round_snapshot(state: &SharedState, snapshot: RoundSnapshot) {
    if let Some(event) = round_snapshot_event(snapshot) {
        state.overlay_sse().broadcast(event);
    }
}

/// Render a snapshot as a `round.snapshot` event, e.g. to greet a new subscriber.
pub fn round_snapshot_event(snapshot: RoundSnapshot) -> Option<ServerEvent> {
    encode(EVENT_ROUND_SNAPSHOT, &OverlaySnapshot::from(snapshot))
}

/// Send a human-readable info message onto the overlay stream.
pub fn broadcast_info(state: &SharedState, message: &str) {
    state.overlay_sse().broadcast(ServerEvent::new(
        Some(EVENT_INFO.to_string()),
        message.to_string(),
    ));
}

fn encode(event: &str, payload: &impl Serialize) -> Option<ServerEvent> {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(event, error = %err, "failed to serialize overlay SSE payload");
            None
        }
    }
}
