//! WordTwitch Back binary entrypoint wiring the round engine, chat bridge, presenter loop
//! and HTTP/SSE layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod dto;
mod error;
mod routes;
mod services;
mod state;

use config::{AppConfig, ChatCredentials};
use dao::{dictionary::Dictionary, leaderboard::Leaderboard, score_store::json_file::JsonFileStore};
use services::{chat_bridge, display_service};
use state::{
    AppState, SharedState, engine::RoundEngine, puzzle::GameMode, state_machine::StartTrigger,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let dictionary = Arc::new(Dictionary::load(&config.words_file));
    let leaderboard = Leaderboard::load(Box::new(JsonFileStore::new(config.leaderboard_file.clone())));
    if dictionary.is_empty() && config.game.mode == GameMode::Pool {
        warn!("dictionary is empty; every letter-pool guess will be rejected");
    }
    info!(
        mode = ?config.game.mode,
        words = dictionary.len(),
        players = leaderboard.len(),
        "round engine ready"
    );
    let mut engine = RoundEngine::new(config.game.clone(), dictionary, leaderboard);
    engine
        .start(StartTrigger::Boot, std::time::Instant::now())
        .context("starting first round")?;

    let (app_state, outbox) = AppState::new(engine, config.admin_token.clone());

    match ChatCredentials::from_env() {
        Some(credentials) => {
            info!(channel = %credentials.channel, nick = %credentials.nick, "starting chat bridge");
            tokio::spawn(chat_bridge::run_chat_supervisor(
                app_state.clone(),
                credentials,
                outbox,
            ));
        }
        None => {
            warn!("TWITCH_TOKEN missing or placeholder; chat bridge disabled, use /admin/chat");
            tokio::spawn(chat_bridge::log_replies(outbox));
        }
    }

    let display = tokio::spawn(display_service::run_display_loop(
        app_state.clone(),
        config.frame_interval(),
    ));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal(app_state.clone()))
        .await
        .context("serving axum")?;

    app_state.request_shutdown();
    if let Err(err) = display.await {
        warn!(error = %err, "presenter loop ended abnormally");
    }
    flush_leaderboard(&app_state).await;
    info!("bye");

    Ok(())
}

/// Persist any award whose save failed earlier.
async fn flush_leaderboard(state: &SharedState) {
    let result = state.with_engine(|engine| engine.flush_leaderboard()).await;
    if let Err(err) = result {
        error!(error = %err, "final leaderboard save failed; recent awards are lost");
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C, SIGTERM or a presenter quit and shut the server down gracefully.
///
/// Whatever the trigger, the shutdown watch is flipped so overlay streams close and
/// graceful shutdown can finish.
async fn shutdown_signal(state: SharedState) {
    wait_for_signal(&state).await;
    state.request_shutdown();
}

async fn wait_for_signal(state: &SharedState) {
    let mut quit = state.shutdown_watcher();
    let quit_requested = async move {
        let _ = quit.wait_for(|requested| *requested).await;
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                    _ = quit_requested => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = quit_requested => {},
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = quit_requested => {},
        }
    }
}
