//! Chat command routing: turns one inbound chat event into engine calls and a reply.
//!
//! The chat bridge and the `/admin/chat` route both funnel through
//! [`handle_chat_event`], so a locally injected message behaves exactly like one read
//! from the channel.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::{
    dao::leaderboard::LeaderboardEntry,
    dto::chat::ChatEvent,
    state::{
        SharedState,
        engine::{GuessOutcome, RoundEngine},
        puzzle::GameMode,
        state_machine::{StartTrigger, StopReason},
    },
};

const POOL_STARTED_REPLY: &str = "Round started! Form words from the letters on screen.";
const WORD_STARTED_REPLY: &str = "New word is up! Guess it in chat.";
const STOPPED_REPLY: &str = "Round stopped by mod.";

/// What a chat line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `!start`, privileged only.
    Start,
    /// `!stop`, privileged only.
    Stop,
    /// `!leaderboard`, open to everyone.
    Leaderboard,
    /// Anything else, including unknown `!` commands.
    Guess(String),
}

/// Classify a chat line. The command token is matched case-insensitively.
pub fn parse_command(text: &str) -> ChatCommand {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix('!') else {
        return ChatCommand::Guess(trimmed.to_string());
    };

    let token = rest.split_whitespace().next().unwrap_or_default();
    match token.to_lowercase().as_str() {
        "start" => ChatCommand::Start,
        "stop" => ChatCommand::Stop,
        "leaderboard" => ChatCommand::Leaderboard,
        _ => ChatCommand::Guess(trimmed.to_string()),
    }
}

/// Apply one chat event to the engine and queue the reply, if any, for the channel.
///
/// Returns the reply so callers without a chat connection can surface it.
pub async fn handle_chat_event(state: &SharedState, event: ChatEvent) -> Option<String> {
    if event.is_echo {
        return None;
    }

    let command = parse_command(&event.text);
    let now = Instant::now();
    let reply = state
        .with_engine(|engine| apply_command(engine, &event, command, now))
        .await?;

    state.send_chat(reply.clone());
    Some(reply)
}

fn apply_command(
    engine: &mut RoundEngine,
    event: &ChatEvent,
    command: ChatCommand,
    now: Instant,
) -> Option<String> {
    match command {
        ChatCommand::Start | ChatCommand::Stop if !event.is_privileged => {
            debug!(user = %event.sender, ?command, "ignoring round command from viewer");
            None
        }
        ChatCommand::Start => match engine.start(StartTrigger::ChatCommand, now) {
            Ok(round_id) => {
                info!(user = %event.sender, %round_id, "round started from chat");
                let reply = match engine.mode() {
                    GameMode::Pool => POOL_STARTED_REPLY,
                    GameMode::SingleWord => WORD_STARTED_REPLY,
                };
                Some(reply.to_string())
            }
            Err(err) => {
                warn!(user = %event.sender, error = %err, "chat start rejected");
                None
            }
        },
        ChatCommand::Stop => match engine.stop(StopReason::ChatCommand) {
            Ok(()) => Some(STOPPED_REPLY.to_string()),
            Err(err) => {
                debug!(user = %event.sender, error = %err, "chat stop ignored");
                None
            }
        },
        ChatCommand::Leaderboard => Some(format_leaderboard(&engine.leaderboard_query())),
        ChatCommand::Guess(text) => {
            match engine.submit_guess(&event.sender, &text, event.is_supporter, now) {
                GuessOutcome::Found { word, points, .. } => Some(format!(
                    "✅ {} found '{word}' (+{points} pts)",
                    event.sender
                )),
                GuessOutcome::Solved { word, .. } => Some(format!(
                    "🎉 {} guessed it! The word was '{word}'. Next word incoming!",
                    event.sender
                )),
                GuessOutcome::Rejected(_) => None,
            }
        }
    }
}

fn format_leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "Leaderboard: No scores yet".to_string();
    }
    let rows = entries
        .iter()
        .map(|entry| format!("{}: {}", entry.user, entry.score))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Leaderboard: {rows}")
}
