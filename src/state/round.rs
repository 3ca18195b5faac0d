use std::{
    collections::HashSet,
    time::{Duration, Instant, SystemTime},
};

use uuid::Uuid;

use crate::state::puzzle::PuzzleState;

/// One play session with its own puzzle. Replaced wholesale by the next start.
#[derive(Debug, Clone)]
pub struct RoundSession {
    /// Identifier surfaced to overlays so they can tell rounds apart.
    pub id: Uuid,
    /// Guessable surface of the round.
    pub puzzle: PuzzleState,
    /// Words already scored this round (letter-pool mode only).
    pub awarded: HashSet<String>,
    /// Wall-clock start, for display.
    pub started_at: SystemTime,
    /// Monotonic deadline; `None` for untimed single-word rounds.
    pub ends_at: Option<Instant>,
    /// Who solved the previous word (single-word mode only).
    pub last_winner: Option<String>,
}

impl RoundSession {
    /// Build a fresh session around `puzzle`, timed when `duration` is given.
    pub fn new(puzzle: PuzzleState, now: Instant, duration: Option<Duration>) -> Self {
        Self {
            id: Uuid::new_v4(),
            puzzle,
            awarded: HashSet::new(),
            started_at: SystemTime::now(),
            ends_at: duration.map(|duration| now + duration),
            last_winner: None,
        }
    }

    /// Time left before the deadline, saturating at zero. `None` when untimed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.ends_at
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Whether the deadline has been reached.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.ends_at.is_some_and(|deadline| deadline <= now)
    }
}
