use thiserror::Error;

/// Lifecycle phases of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// No round is accepting guesses; the last puzzle stays on screen.
    Inactive,
    /// A round is running and guesses are validated against its puzzle.
    Active,
}

/// What asked for a new round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTrigger {
    /// First round armed when the process starts.
    Boot,
    /// Manual start from the presenter (overlay admin controls).
    Presenter,
    /// Privileged `!start` in chat.
    ChatCommand,
    /// Single-word mode re-arming after the target was guessed.
    Solved,
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Privileged `!stop` in chat.
    ChatCommand,
    /// Stop requested from the presenter (overlay admin controls).
    Presenter,
    /// The round timer ran out, detected on a display tick.
    TimerExpired,
}

/// Events that can be applied to the round state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    /// Begin a new round, replacing any running one.
    Start(StartTrigger),
    /// End the running round.
    Stop(StopReason),
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: RoundPhase,
    /// The event that cannot be applied from this phase.
    pub event: RoundEvent,
}

/// State machine implementing the round lifecycle.
#[derive(Debug, Clone)]
pub struct RoundStateMachine {
    phase: RoundPhase,
    version: usize,
}

impl Default for RoundStateMachine {
    fn default() -> Self {
        Self {
            phase: RoundPhase::Inactive,
            version: 0,
        }
    }
}

impl RoundStateMachine {
    /// Create a new state machine initialised in the inactive state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Number of transitions applied so far.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Validate and apply `event`, returning the new phase.
    pub fn apply(&mut self, event: RoundEvent) -> Result<RoundPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    fn compute_transition(&self, event: RoundEvent) -> Result<RoundPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (_, RoundEvent::Start(_)) => RoundPhase::Active,
            (RoundPhase::Active, RoundEvent::Stop(_)) => RoundPhase::Inactive,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
