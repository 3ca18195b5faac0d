pub mod engine;
pub mod puzzle;
pub mod round;
mod sse;
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tracing::debug;

pub use self::sse::SseHub;
use self::engine::RoundEngine;

/// Handle to the application state shared by every task and handler.
pub type SharedState = Arc<AppState>;
/// Receiving end of the outbound chat queue, owned by whoever delivers replies.
pub type ChatOutbox = mpsc::UnboundedReceiver<String>;

const OVERLAY_SSE_CAPACITY: usize = 16;

/// Central application state shared by the presenter loop, the chat bridge and HTTP handlers.
pub struct AppState {
    engine: Mutex<RoundEngine>,
    overlay: SseHub,
    chat_outbound: mpsc::UnboundedSender<String>,
    chat_connected: watch::Sender<bool>,
    shutdown: watch::Sender<bool>,
    admin_token: Option<String>,
}

impl AppState {
    /// Wrap `engine` into shared state, returning the outbound chat queue alongside it.
    pub fn new(engine: RoundEngine, admin_token: Option<String>) -> (SharedState, ChatOutbox) {
        let (chat_tx, chat_rx) = mpsc::unbounded_channel();
        let (connected_tx, _rx) = watch::channel(false);
        let (shutdown_tx, _rx) = watch::channel(false);
        let state = Arc::new(Self {
            engine: Mutex::new(engine),
            overlay: SseHub::new(OVERLAY_SSE_CAPACITY),
            chat_outbound: chat_tx,
            chat_connected: connected_tx,
            shutdown: shutdown_tx,
            admin_token,
        });
        (state, chat_rx)
    }

    /// Run `f` with exclusive access to the round engine.
    ///
    /// This is the single critical section for round state and the leaderboard; keep `f`
    /// short and free of network I/O.
    pub async fn with_engine<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut RoundEngine) -> T,
    {
        let mut guard = self.engine.lock().await;
        f(&mut *guard)
    }

    /// Broadcast hub feeding overlay SSE clients.
    pub fn overlay_sse(&self) -> &SseHub {
        &self.overlay
    }

    /// Queue a reply for the chat channel. Delivery is best effort.
    pub fn send_chat(&self, text: String) {
        if let Err(err) = self.chat_outbound.send(text) {
            debug!(reply = %err.0, "no chat outbox; dropping reply");
        }
    }

    /// Record whether the chat bridge is joined.
    pub fn set_chat_connected(&self, connected: bool) {
        self.chat_connected.send_replace(connected);
    }

    /// Whether the chat bridge is joined.
    pub fn is_chat_connected(&self) -> bool {
        *self.chat_connected.borrow()
    }

    /// Ask every loop to wind down (presenter quit).
    pub fn request_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Subscribe to the quit signal.
    pub fn shutdown_watcher(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Token required on admin routes, if configured.
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }
}
