//! Payloads rendered by overlay clients (SSE `round.snapshot` events and `/public/round`).

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::leaderboard::LeaderboardEntry,
    dto::format_system_time,
    state::{
        engine::{PuzzleView, RoundSnapshot},
        state_machine::RoundPhase,
    },
};

/// Publicly visible round phase.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleRoundPhase {
    /// Guesses are ignored; waiting for a start.
    Inactive,
    /// Guesses are accepted.
    Active,
}

impl From<RoundPhase> for VisibleRoundPhase {
    fn from(value: RoundPhase) -> Self {
        match value {
            RoundPhase::Inactive => VisibleRoundPhase::Inactive,
            RoundPhase::Active => VisibleRoundPhase::Active,
        }
    }
}

/// Puzzle surface, tagged by mode.
#[derive(Debug, Serialize, ToSchema, Clone)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PuzzleDto {
    /// Single-word mode: first letter plus `_` placeholders.
    SingleWord {
        /// Masked target.
        mask: String,
    },
    /// Letter-pool mode: shuffled letters, one per entry.
    Pool {
        /// Pool letters in display order.
        letters: Vec<String>,
    },
}

impl From<PuzzleView> for PuzzleDto {
    fn from(value: PuzzleView) -> Self {
        match value {
            PuzzleView::Mask(mask) => PuzzleDto::SingleWord { mask },
            PuzzleView::Pool(letters) => PuzzleDto::Pool {
                letters: letters.into_iter().map(String::from).collect(),
            },
        }
    }
}

/// Leaderboard row.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct LeaderboardEntryDto {
    pub user: String,
    pub score: u32,
}

impl From<LeaderboardEntry> for LeaderboardEntryDto {
    fn from(value: LeaderboardEntry) -> Self {
        Self {
            user: value.user,
            score: value.score,
        }
    }
}

/// Everything an overlay needs to draw one frame.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct OverlaySnapshot {
    pub round_id: Uuid,
    /// Bumped on every start or stop, so overlays can detect transitions.
    pub version: usize,
    pub phase: VisibleRoundPhase,
    pub puzzle: PuzzleDto,
    /// RFC 3339 start timestamp.
    pub started_at: String,
    /// Whole seconds left; absent for inactive or untimed rounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_remaining: Option<u64>,
    pub words_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_winner: Option<String>,
    pub leaderboard: Vec<LeaderboardEntryDto>,
    /// Latest announcements, newest first.
    pub recent: Vec<String>,
}

impl From<RoundSnapshot> for OverlaySnapshot {
    fn from(value: RoundSnapshot) -> Self {
        Self {
            round_id: value.round_id,
            version: value.version,
            phase: value.phase.into(),
            puzzle: value.puzzle.into(),
            started_at: format_system_time(value.started_at),
            seconds_remaining: value.seconds_remaining,
            words_found: value.words_found,
            last_winner: value.last_winner,
            leaderboard: value.leaderboard.into_iter().map(Into::into).collect(),
            recent: value.recent,
        }
    }
}
