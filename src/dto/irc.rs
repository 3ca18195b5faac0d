//! Minimal IRCv3 line codec for Twitch chat (tags, prefix, command, params).

use std::collections::HashMap;

use crate::dto::chat::ChatEvent;

/// One parsed IRC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcMessage {
    /// IRCv3 message tags with escapes resolved.
    pub tags: HashMap<String, String>,
    /// Source of the message, without the leading `:`.
    pub prefix: Option<String>,
    /// Command or numeric, e.g. `PRIVMSG`, `PING`, `001`.
    pub command: String,
    /// Middle params followed by the trailing param, if any.
    pub params: Vec<String>,
}

impl IrcMessage {
    /// Parse a single line (CR/LF already stripped or not). Returns `None` for blank or
    /// command-less lines.
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        let mut tags = HashMap::new();
        if let Some(stripped) = rest.strip_prefix('@') {
            let (raw_tags, remainder) = stripped.split_once(' ')?;
            for pair in raw_tags.split(';').filter(|pair| !pair.is_empty()) {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                tags.insert(key.to_string(), unescape_tag_value(value));
            }
            rest = remainder.trim_start();
        }

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (source, remainder) = stripped.split_once(' ')?;
            prefix = Some(source.to_string());
            rest = remainder.trim_start();
        }

        let (head, trailing) = match rest.split_once(" :") {
            Some((head, trailing)) => (head, Some(trailing)),
            None => (rest, None),
        };

        let mut words = head.split(' ').filter(|word| !word.is_empty());
        let command = words.next()?.to_string();
        let mut params: Vec<String> = words.map(str::to_string).collect();
        if let Some(trailing) = trailing {
            params.push(trailing.to_string());
        }

        Some(Self {
            tags,
            prefix,
            command,
            params,
        })
    }

    /// Tag value by key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Nickname part of the prefix (`nick!user@host`).
    pub fn nick(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .map(|prefix| prefix.split('!').next().unwrap_or(prefix))
    }

    /// Last parameter, which carries the message body for `PRIVMSG`.
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    fn has_badge(&self, names: &[&str]) -> bool {
        self.tag("badges").is_some_and(|badges| {
            badges
                .split(',')
                .filter_map(|badge| badge.split('/').next())
                .any(|badge| names.contains(&badge))
        })
    }

    /// Decode a `PRIVMSG` into a chat event. Any other command yields `None`.
    ///
    /// The sender identity is the lowercase login so scores survive display-name changes.
    pub fn to_chat_event(&self, bot_login: &str) -> Option<ChatEvent> {
        if self.command != "PRIVMSG" {
            return None;
        }

        let sender = self
            .nick()
            .filter(|nick| !nick.is_empty())
            .map(str::to_lowercase)
            .or_else(|| self.tag("display-name").map(str::to_lowercase))?;
        let text = self.trailing().unwrap_or_default().to_string();

        let is_privileged =
            self.tag("mod") == Some("1") || self.has_badge(&["broadcaster", "moderator"]);
        let is_supporter =
            self.tag("subscriber") == Some("1") || self.has_badge(&["subscriber", "founder"]);
        let is_echo = sender.eq_ignore_ascii_case(bot_login);

        Some(ChatEvent {
            sender,
            text,
            is_privileged,
            is_supporter,
            is_echo,
        })
    }
}

/// Format an outbound chat line. Line breaks are flattened so a reply cannot smuggle a
/// second IRC command.
pub fn format_privmsg(channel: &str, text: &str) -> String {
    let body: String = text
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    format!("PRIVMSG #{channel} :{body}")
}

fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('\\') => out.push('\\'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
