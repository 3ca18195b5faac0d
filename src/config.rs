//! Application-level configuration loading: game tuning, file locations and chat credentials.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::puzzle::GameMode;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "WORDTWITCH_CONFIG_PATH";

const DEFAULT_ROUND_SECONDS: u64 = 60;
const DEFAULT_MIN_WORD_LENGTH: usize = 3;
const DEFAULT_POOL_SIZE: usize = 9;
const DEFAULT_FAKE_LETTERS: usize = 1;
const DEFAULT_FRAME_RATE: u32 = 30;
const DEFAULT_DISPLAY_TOP: usize = 6;
const DEFAULT_WORDS_FILE: &str = "words.txt";
const DEFAULT_LEADERBOARD_FILE: &str = "leaderboard.json";
const DEFAULT_SINGLE_WORDS: [&str; 9] = [
    "python", "stream", "twitch", "overlay", "chat", "neon", "music", "guess", "game",
];

const DEFAULT_CHANNEL: &str = "GuessTheWordGame";
const DEFAULT_NICK: &str = "botname";
/// Placeholder token shipped in sample environments; treated as "no credential".
const DUMMY_TOKEN: &str = "dummy_token";

/// Tuning consumed by the round engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    /// Letter-pool or single-word play.
    pub mode: GameMode,
    /// Length of a timed letter-pool round.
    pub round_duration: Duration,
    /// Shortest guess accepted in letter-pool mode.
    pub min_word_length: usize,
    /// Letters shown per letter-pool round.
    pub pool_size: usize,
    /// Decoy letters written over each pool.
    pub fake_letters: usize,
    /// Candidate targets for single-word mode. Never empty.
    pub single_words: Vec<String>,
    /// Leaderboard rows included in overlay snapshots.
    pub display_top: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::Pool,
            round_duration: Duration::from_secs(DEFAULT_ROUND_SECONDS),
            min_word_length: DEFAULT_MIN_WORD_LENGTH,
            pool_size: DEFAULT_POOL_SIZE,
            fake_letters: DEFAULT_FAKE_LETTERS,
            single_words: DEFAULT_SINGLE_WORDS.iter().map(|w| w.to_string()).collect(),
            display_top: DEFAULT_DISPLAY_TOP,
        }
    }
}

/// Credentials for the Twitch chat bridge.
#[derive(Clone)]
pub struct ChatCredentials {
    /// Channel to join, without the leading `#`.
    pub channel: String,
    /// Bot login used for `NICK` and echo filtering.
    pub nick: String,
    /// OAuth token, with or without the `oauth:` prefix.
    pub token: String,
}

impl std::fmt::Debug for ChatCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCredentials")
            .field("channel", &self.channel)
            .field("nick", &self.nick)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl ChatCredentials {
    /// Read `TWITCH_CHANNEL`, `TWITCH_NICK` and `TWITCH_TOKEN`.
    ///
    /// Returns `None` when the token is missing or still the placeholder, in which case the
    /// chat bridge is not started.
    pub fn from_env() -> Option<Self> {
        let token = env::var("TWITCH_TOKEN").ok()?;
        Self::from_parts(
            env::var("TWITCH_CHANNEL").ok(),
            env::var("TWITCH_NICK").ok(),
            token,
        )
    }

    fn from_parts(channel: Option<String>, nick: Option<String>, token: String) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() || token == DUMMY_TOKEN {
            return None;
        }

        let channel = channel
            .map(|value| value.trim().trim_start_matches('#').to_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CHANNEL.to_lowercase());
        let nick = nick
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_NICK.into());

        Some(Self {
            channel,
            nick,
            token: token.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Round engine tuning.
    pub game: GameSettings,
    /// Presenter frame rate, in frames per second.
    pub frame_rate: u32,
    /// Newline-delimited dictionary.
    pub words_file: PathBuf,
    /// JSON leaderboard record.
    pub leaderboard_file: PathBuf,
    /// Token required on admin routes, when set.
    pub admin_token: Option<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        mode = ?app_config.game.mode,
                        "loaded config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Interval between two presenter frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game: GameSettings::default(),
            frame_rate: DEFAULT_FRAME_RATE,
            words_file: PathBuf::from(DEFAULT_WORDS_FILE),
            leaderboard_file: PathBuf::from(DEFAULT_LEADERBOARD_FILE),
            admin_token: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    mode: Option<GameMode>,
    round_seconds: Option<u64>,
    min_word_length: Option<usize>,
    pool_size: Option<usize>,
    fake_letters: Option<usize>,
    frame_rate: Option<u32>,
    words_file: Option<PathBuf>,
    leaderboard_file: Option<PathBuf>,
    single_words: Option<Vec<String>>,
    display_top: Option<usize>,
    admin_token: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();

        let single_words = value
            .single_words
            .map(|words| {
                words
                    .into_iter()
                    .map(|word| word.trim().to_lowercase())
                    .filter(|word| !word.is_empty())
                    .collect::<Vec<_>>()
            })
            .and_then(|words| non_empty(words, "single_words"))
            .unwrap_or(defaults.game.single_words);

        let game = GameSettings {
            mode: value.mode.unwrap_or(defaults.game.mode),
            round_duration: value
                .round_seconds
                .and_then(|secs| positive(secs, "round_seconds"))
                .map(Duration::from_secs)
                .unwrap_or(defaults.game.round_duration),
            min_word_length: value
                .min_word_length
                .and_then(|len| positive(len, "min_word_length"))
                .unwrap_or(defaults.game.min_word_length),
            pool_size: value
                .pool_size
                .and_then(|size| positive(size, "pool_size"))
                .unwrap_or(defaults.game.pool_size),
            fake_letters: value.fake_letters.unwrap_or(defaults.game.fake_letters),
            single_words,
            display_top: value.display_top.unwrap_or(defaults.game.display_top),
        };

        Self {
            game,
            frame_rate: value
                .frame_rate
                .and_then(|fps| positive(fps, "frame_rate"))
                .unwrap_or(defaults.frame_rate),
            words_file: value.words_file.unwrap_or(defaults.words_file),
            leaderboard_file: value.leaderboard_file.unwrap_or(defaults.leaderboard_file),
            admin_token: value
                .admin_token
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
        }
    }
}

fn positive<T>(value: T, field: &'static str) -> Option<T>
where
    T: PartialOrd + Default + Copy + std::fmt::Display,
{
    if value > T::default() {
        Some(value)
    } else {
        warn!(field, %value, "config value must be positive; using default");
        None
    }
}

fn non_empty(words: Vec<String>, field: &'static str) -> Option<Vec<String>> {
    if words.is_empty() {
        warn!(field, "config list must not be empty; using default");
        None
    } else {
        Some(words)
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AppConfig {
        serde_json::from_str::<RawConfig>(json).unwrap().into()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse("{}");
        assert_eq!(config.game, GameSettings::default());
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.words_file, PathBuf::from("words.txt"));
        assert!(config.admin_token.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = parse(
            r#"{
                "mode": "single_word",
                "round_seconds": 90,
                "pool_size": 12,
                "fake_letters": 0,
                "frame_rate": 60,
                "single_words": [" Rust ", "Ferris"],
                "admin_token": "secret"
            }"#,
        );
        assert_eq!(config.game.mode, GameMode::SingleWord);
        assert_eq!(config.game.round_duration, Duration::from_secs(90));
        assert_eq!(config.game.pool_size, 12);
        assert_eq!(config.game.fake_letters, 0);
        assert_eq!(config.game.single_words, vec!["rust", "ferris"]);
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.admin_token.as_deref(), Some("secret"));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = parse(
            r#"{ "pool_size": 0, "frame_rate": 0, "round_seconds": 0, "single_words": ["  "] }"#,
        );
        assert_eq!(config.game.pool_size, 9);
        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.game.round_duration, Duration::from_secs(60));
        assert_eq!(config.game.single_words.len(), 9);
    }

    #[test]
    fn frame_interval_follows_frame_rate() {
        let config = AppConfig {
            frame_rate: 50,
            ..AppConfig::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_millis(20));
    }

    #[test]
    fn placeholder_token_disables_chat() {
        assert!(ChatCredentials::from_parts(None, None, "dummy_token".into()).is_none());
        assert!(ChatCredentials::from_parts(None, None, "   ".into()).is_none());

        let creds =
            ChatCredentials::from_parts(Some("#MyChannel".into()), None, "oauth:abc".into())
                .unwrap();
        assert_eq!(creds.channel, "mychannel");
        assert_eq!(creds.nick, "botname");
        assert_eq!(creds.token, "oauth:abc");
    }
}
