use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Fan-out point for overlay events. Overlays that fall behind skip frames rather than
/// slowing the presenter loop.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Hub buffering at most `capacity` undelivered events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event broadcast from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Number of connected overlays.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Send to all current subscribers. Having none is not an error.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
