/// Structured inbound chat message, as decoded by the chat bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Sender identity (lowercase login); leaderboard key.
    pub sender: String,
    /// Raw message body.
    pub text: String,
    /// Broadcaster or moderator, allowed to run round-control commands.
    pub is_privileged: bool,
    /// Paying subscriber, worth more points in single-word mode.
    pub is_supporter: bool,
    /// The bot's own message reflected back by the channel.
    pub is_echo: bool,
}
