//! The round engine: the single owner and mutator of round state and the leaderboard.
//!
//! Every method takes `&mut self`; callers reach the engine through the one mutex held
//! by [`crate::state::AppState`], so guesses from chat and round control from the
//! presenter never interleave.

use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Instant, SystemTime},
};

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::GameSettings,
    dao::{
        dictionary::Dictionary,
        leaderboard::{Leaderboard, LeaderboardEntry},
        storage::StorageResult,
    },
    state::{
        puzzle::{self, GameMode, PuzzleState},
        round::RoundSession,
        state_machine::{
            InvalidTransition, RoundEvent, RoundPhase, RoundStateMachine, StartTrigger, StopReason,
        },
    },
};

/// Number of entries returned by a leaderboard query.
pub const LEADERBOARD_QUERY_SIZE: usize = 5;
/// Announcements kept for the overlay's recent feed.
const RECENT_CAPACITY: usize = 6;
/// Points for solving a single-word puzzle.
const SOLVE_POINTS: u32 = 1;
/// Points for solving a single-word puzzle as a paying supporter.
const SUPPORTER_SOLVE_POINTS: u32 = 3;

/// Why a guess was ignored. Rejections are silent: no state change and no chat reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No round is running, or its timer already ran out.
    Inactive,
    /// Shorter than the configured minimum word length.
    TooShort,
    /// Contains something other than letters.
    NotAlphabetic,
    /// Not in the dictionary.
    UnknownWord,
    /// Needs letters the pool does not have.
    NotFormable,
    /// Already scored this round.
    AlreadyAwarded,
    /// Not the single-word target.
    Incorrect,
}

/// Result of submitting a guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Letter-pool word accepted and credited.
    Found {
        /// Normalised word.
        word: String,
        /// Points awarded for it.
        points: u32,
        /// Guesser's total after the award.
        total: u32,
    },
    /// Single-word target guessed; a new target is already in place.
    Solved {
        /// The target that was guessed.
        word: String,
        /// Points awarded.
        points: u32,
        /// Guesser's total after the award.
        total: u32,
    },
    /// Ignored guess.
    Rejected(Rejection),
}

/// What the presenter may show of the puzzle. Never exposes a single-word target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleView {
    /// First letter plus placeholders.
    Mask(String),
    /// Shuffled pool letters.
    Pool(Vec<char>),
}

/// Consistent, owned copy of everything the presenter renders in one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSnapshot {
    /// Current round identifier.
    pub round_id: Uuid,
    /// State machine version, bumped on every start/stop.
    pub version: usize,
    /// Whether guesses are accepted.
    pub phase: RoundPhase,
    /// Visible puzzle surface.
    pub puzzle: PuzzleView,
    /// Wall-clock start of the round.
    pub started_at: SystemTime,
    /// Whole seconds left on an active timed round.
    pub seconds_remaining: Option<u64>,
    /// Words scored so far this round.
    pub words_found: usize,
    /// Solver of the previous single-word puzzle.
    pub last_winner: Option<String>,
    /// Top of the leaderboard for display.
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Latest announcements, newest first.
    pub recent: Vec<String>,
}

/// Owns the current round, the leaderboard and the randomness used to build puzzles.
pub struct RoundEngine {
    settings: GameSettings,
    dictionary: Arc<Dictionary>,
    machine: RoundStateMachine,
    session: RoundSession,
    leaderboard: Leaderboard,
    recent: VecDeque<String>,
    rng: StdRng,
}

impl RoundEngine {
    /// Build an inactive engine seeded from the OS random source.
    pub fn new(settings: GameSettings, dictionary: Arc<Dictionary>, leaderboard: Leaderboard) -> Self {
        Self::with_rng(settings, dictionary, leaderboard, StdRng::from_os_rng())
    }

    /// Build an inactive engine with an explicit random generator.
    pub fn with_rng(
        settings: GameSettings,
        dictionary: Arc<Dictionary>,
        leaderboard: Leaderboard,
        mut rng: StdRng,
    ) -> Self {
        let puzzle = generate_puzzle(&settings, &dictionary, &mut rng);
        let session = RoundSession::new(puzzle, Instant::now(), None);
        Self {
            settings,
            dictionary,
            machine: RoundStateMachine::new(),
            session,
            leaderboard,
            recent: VecDeque::with_capacity(RECENT_CAPACITY),
            rng,
        }
    }

    /// Game mode in play.
    pub fn mode(&self) -> GameMode {
        self.settings.mode
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RoundPhase {
        self.machine.phase()
    }

    /// Read-only access to the leaderboard.
    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Start a new round, replacing the current one (running or not).
    ///
    /// Letter-pool rounds get a deadline `round_seconds` from `now`; single-word rounds
    /// are untimed.
    pub fn start(&mut self, trigger: StartTrigger, now: Instant) -> Result<Uuid, InvalidTransition> {
        self.machine.apply(RoundEvent::Start(trigger))?;

        let puzzle = generate_puzzle(&self.settings, &self.dictionary, &mut self.rng);
        let duration = match self.settings.mode {
            GameMode::Pool => Some(self.settings.round_duration),
            GameMode::SingleWord => None,
        };
        self.session = RoundSession::new(puzzle, now, duration);

        if let PuzzleState::LetterPool { letters } = &self.session.puzzle {
            info!(
                round_id = %self.session.id,
                ?trigger,
                pool = %letters.iter().collect::<String>(),
                "round started"
            );
        } else {
            debug!(round_id = %self.session.id, ?trigger, "new word armed");
        }

        Ok(self.session.id)
    }

    /// End the running round. Stopping an inactive engine is an invalid transition.
    pub fn stop(&mut self, reason: StopReason) -> Result<(), InvalidTransition> {
        self.machine.apply(RoundEvent::Stop(reason))?;
        info!(round_id = %self.session.id, ?reason, "round stopped");

        let notice = match reason {
            StopReason::TimerExpired => "Round ended.",
            StopReason::ChatCommand | StopReason::Presenter => "Round stopped.",
        };
        self.push_recent(notice.to_string());
        Ok(())
    }

    /// Stop the round if its timer ran out. Returns whether it expired on this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.machine.phase() != RoundPhase::Active || !self.session.is_expired(now) {
            return false;
        }

        match self.stop(StopReason::TimerExpired) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to expire round");
                false
            }
        }
    }

    /// Validate `text` as a guess by `user` and credit them when it is accepted.
    ///
    /// Accepted awards are persisted before this returns.
    pub fn submit_guess(
        &mut self,
        user: &str,
        text: &str,
        is_supporter: bool,
        now: Instant,
    ) -> GuessOutcome {
        if self.machine.phase() != RoundPhase::Active || self.session.is_expired(now) {
            return GuessOutcome::Rejected(Rejection::Inactive);
        }

        let guess = text.trim().to_lowercase();
        match self.settings.mode {
            GameMode::Pool => self.submit_pool_guess(user, guess),
            GameMode::SingleWord => self.submit_single_word_guess(user, guess, is_supporter, now),
        }
    }

    fn submit_pool_guess(&mut self, user: &str, guess: String) -> GuessOutcome {
        if let Err(rejection) = self.validate_pool_guess(&guess) {
            debug!(user = %user, guess = %guess, ?rejection, "guess rejected");
            return GuessOutcome::Rejected(rejection);
        }

        let points = pool_points(guess.chars().count());
        let total = self.leaderboard.record_award(user, points);
        self.session.awarded.insert(guess.clone());
        self.push_recent(format!("{user}: {guess} (+{points})"));
        info!(
            round_id = %self.session.id,
            user = %user,
            word = %guess,
            points,
            total,
            "word found"
        );

        GuessOutcome::Found {
            word: guess,
            points,
            total,
        }
    }

    fn validate_pool_guess(&self, guess: &str) -> Result<(), Rejection> {
        let PuzzleState::LetterPool { letters } = &self.session.puzzle else {
            return Err(Rejection::Incorrect);
        };

        if guess.chars().count() < self.settings.min_word_length {
            return Err(Rejection::TooShort);
        }
        if !guess.chars().all(char::is_alphabetic) {
            return Err(Rejection::NotAlphabetic);
        }
        if !self.dictionary.contains(guess) {
            return Err(Rejection::UnknownWord);
        }
        if !puzzle::can_form(guess, letters) {
            return Err(Rejection::NotFormable);
        }
        if self.session.awarded.contains(guess) {
            return Err(Rejection::AlreadyAwarded);
        }
        Ok(())
    }

    fn submit_single_word_guess(
        &mut self,
        user: &str,
        guess: String,
        is_supporter: bool,
        now: Instant,
    ) -> GuessOutcome {
        let PuzzleState::SingleWord { target, .. } = &self.session.puzzle else {
            return GuessOutcome::Rejected(Rejection::Incorrect);
        };
        if *target != guess {
            return GuessOutcome::Rejected(Rejection::Incorrect);
        }

        let points = if is_supporter {
            SUPPORTER_SOLVE_POINTS
        } else {
            SOLVE_POINTS
        };
        let total = self.leaderboard.record_award(user, points);
        info!(user = %user, word = %guess, points, total, "word solved");

        if let Err(err) = self.start(StartTrigger::Solved, now) {
            warn!(error = %err, "failed to arm next word");
        }
        self.session.last_winner = Some(user.to_string());
        self.push_recent(format!("{user} guessed '{guess}'"));

        GuessOutcome::Solved {
            word: guess,
            points,
            total,
        }
    }

    /// Top entries answered to `!leaderboard`.
    pub fn leaderboard_query(&self) -> Vec<LeaderboardEntry> {
        self.leaderboard.top_n(LEADERBOARD_QUERY_SIZE)
    }

    /// Retry persisting the leaderboard if a previous save failed.
    pub fn flush_leaderboard(&mut self) -> StorageResult<()> {
        self.leaderboard.flush()
    }

    /// Copy of the state the presenter needs for one frame.
    pub fn snapshot(&self, now: Instant) -> RoundSnapshot {
        let phase = self.machine.phase();
        let puzzle = match &self.session.puzzle {
            PuzzleState::SingleWord { mask, .. } => PuzzleView::Mask(mask.clone()),
            PuzzleState::LetterPool { letters } => PuzzleView::Pool(letters.clone()),
        };
        let seconds_remaining = match phase {
            RoundPhase::Active => self
                .session
                .remaining(now)
                .map(|remaining| remaining.as_secs()),
            RoundPhase::Inactive => None,
        };

        RoundSnapshot {
            round_id: self.session.id,
            version: self.machine.version(),
            phase,
            puzzle,
            started_at: self.session.started_at,
            seconds_remaining,
            words_found: self.session.awarded.len(),
            last_winner: self.session.last_winner.clone(),
            leaderboard: self.leaderboard.top_n(self.settings.display_top),
            recent: self.recent.iter().cloned().collect(),
        }
    }

    fn push_recent(&mut self, message: String) {
        self.recent.push_front(message);
        self.recent.truncate(RECENT_CAPACITY);
    }

    #[cfg(test)]
    pub(crate) fn install_puzzle(&mut self, puzzle: PuzzleState) {
        self.session.puzzle = puzzle;
    }

    #[cfg(test)]
    pub(crate) fn current_puzzle(&self) -> &PuzzleState {
        &self.session.puzzle
    }
}

/// Letter-pool score: one point per letter, +1 from six letters, +2 more from eight.
pub fn pool_points(len: usize) -> u32 {
    let mut points = u32::try_from(len).unwrap_or(u32::MAX);
    if len >= 6 {
        points += 1;
    }
    if len >= 8 {
        points += 2;
    }
    points
}

fn generate_puzzle(settings: &GameSettings, dictionary: &Dictionary, rng: &mut StdRng) -> PuzzleState {
    match settings.mode {
        GameMode::Pool => {
            puzzle::new_letter_pool(dictionary, settings.pool_size, settings.fake_letters, rng)
        }
        GameMode::SingleWord => puzzle::new_single_word(&settings.single_words, rng),
    }
}
