//! Twitch chat transport: IRC over WebSocket, supervised with exponential backoff.
//!
//! Inbound `PRIVMSG`s are decoded and handed to the chat service one at a time, in
//! arrival order, each to completion before the next is read. Replies queued by the chat
//! service are written back to the channel from the same loop.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{net::TcpStream, sync::watch, time::sleep};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};
use tracing::{debug, info, warn};

use crate::{
    config::ChatCredentials,
    dto::irc::{IrcMessage, format_privmsg},
    services::chat_service,
    state::{ChatOutbox, SharedState},
};

const TWITCH_IRC_URL: &str = "wss://irc-ws.chat.twitch.tv:443";
const INITIAL_DELAY: Duration = Duration::from_secs(1);
const MAX_DELAY: Duration = Duration::from_secs(10);

type ChatSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Failures of one chat connection. All of them lead to a reconnect.
#[derive(Debug, Error)]
pub enum ChatError {
    /// WebSocket or TLS failure.
    #[error("chat transport error: {0}")]
    Transport(#[from] tungstenite::Error),
    /// The server closed the connection.
    #[error("chat connection closed by server")]
    Closed,
    /// Twitch refused the credentials.
    #[error("chat authentication failed: {0}")]
    Authentication(String),
    /// Twitch asked clients to reconnect (maintenance).
    #[error("server requested reconnect")]
    ReconnectRequested,
}

/// Keep a chat connection alive until shutdown, reconnecting with backoff.
pub async fn run_chat_supervisor(
    state: SharedState,
    credentials: ChatCredentials,
    mut outbox: ChatOutbox,
) {
    let mut shutdown = state.shutdown_watcher();
    let mut delay = INITIAL_DELAY;

    loop {
        if *shutdown.borrow() {
            break;
        }

        match connect(&credentials).await {
            Ok(socket) => {
                // Fresh connection: reset the retry backoff.
                delay = INITIAL_DELAY;
                discard_stale_replies(&mut outbox);
                let result =
                    pump(&state, &credentials, socket, &mut outbox, &mut shutdown).await;
                state.set_chat_connected(false);
                match result {
                    Ok(()) => break,
                    Err(err) => warn!(error = %err, "chat connection lost"),
                }
            }
            Err(err) => {
                warn!(error = %err, channel = %credentials.channel, "chat connection attempt failed");
            }
        }

        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown.changed() => break,
        }
        delay = (delay * 2).min(MAX_DELAY);
    }

    info!("chat bridge stopped");
}

/// Log queued replies when no chat connection is configured.
pub async fn log_replies(mut outbox: ChatOutbox) {
    while let Some(reply) = outbox.recv().await {
        info!(%reply, "chat reply (no chat connection)");
    }
}

async fn connect(credentials: &ChatCredentials) -> Result<ChatSocket, ChatError> {
    let (mut socket, _response) = connect_async(TWITCH_IRC_URL).await?;

    let token = credentials
        .token
        .strip_prefix("oauth:")
        .unwrap_or(&credentials.token);
    for line in [
        "CAP REQ :twitch.tv/tags twitch.tv/commands".to_string(),
        format!("PASS oauth:{token}"),
        format!("NICK {}", credentials.nick),
        format!("JOIN #{}", credentials.channel),
    ] {
        socket.send(Message::Text(line)).await?;
    }

    debug!(channel = %credentials.channel, nick = %credentials.nick, "chat handshake sent");
    Ok(socket)
}

/// Serve one connection. `Ok` means shutdown was requested.
async fn pump(
    state: &SharedState,
    credentials: &ChatCredentials,
    socket: ChatSocket,
    outbox: &mut ChatOutbox,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<(), ChatError> {
    let (mut write, mut read) = socket.split();

    loop {
        tokio::select! {
            frame = read.next() => {
                let frame = match frame {
                    Some(frame) => frame?,
                    None => return Err(ChatError::Closed),
                };
                match frame {
                    Message::Text(text) => {
                        for line in text.lines().filter(|line| !line.trim().is_empty()) {
                            if let Some(reply) = handle_line(state, credentials, line).await? {
                                write.send(Message::Text(reply)).await?;
                            }
                        }
                    }
                    Message::Ping(data) => write.send(Message::Pong(data)).await?,
                    Message::Close(_) => return Err(ChatError::Closed),
                    _ => {}
                }
            }
            reply = outbox.recv() => {
                let Some(reply) = reply else {
                    return Ok(());
                };
                write
                    .send(Message::Text(format_privmsg(&credentials.channel, &reply)))
                    .await?;
            }
            _ = shutdown.changed() => {
                let _ = write.send(Message::Close(None)).await;
                return Ok(());
            }
        }
    }
}

/// Handle one IRC line, returning a protocol-level response to send, if any.
async fn handle_line(
    state: &SharedState,
    credentials: &ChatCredentials,
    line: &str,
) -> Result<Option<String>, ChatError> {
    let Some(message) = IrcMessage::parse(line) else {
        return Ok(None);
    };

    match message.command.as_str() {
        "PING" => {
            let origin = message.trailing().unwrap_or("tmi.twitch.tv");
            Ok(Some(format!("PONG :{origin}")))
        }
        "PRIVMSG" => {
            if let Some(event) = message.to_chat_event(&credentials.nick) {
                chat_service::handle_chat_event(state, event).await;
            }
            Ok(None)
        }
        "JOIN" if message.nick() == Some(credentials.nick.as_str()) => {
            info!(channel = %credentials.channel, "joined chat channel");
            state.set_chat_connected(true);
            Ok(None)
        }
        "NOTICE" if is_auth_failure(message.trailing().unwrap_or_default()) => Err(
            ChatError::Authentication(message.trailing().unwrap_or_default().to_string()),
        ),
        "RECONNECT" => Err(ChatError::ReconnectRequested),
        _ => Ok(None),
    }
}

fn is_auth_failure(notice: &str) -> bool {
    let notice = notice.to_lowercase();
    notice.contains("login authentication failed") || notice.contains("improperly formatted auth")
}

fn discard_stale_replies(outbox: &mut ChatOutbox) {
    let mut dropped = 0usize;
    while outbox.try_recv().is_ok() {
        dropped += 1;
    }
    if dropped > 0 {
        debug!(dropped, "discarded replies queued while disconnected");
    }
}
