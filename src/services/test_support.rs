//! Shared fixtures for service tests.

use std::{sync::Arc, time::Instant};

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config::GameSettings,
    dao::{dictionary::Dictionary, leaderboard::Leaderboard, score_store::memory::MemoryStore},
    state::{
        AppState, ChatOutbox, SharedState,
        engine::RoundEngine,
        puzzle::{GameMode, PuzzleState},
        state_machine::StartTrigger,
    },
};

const WORDS: [&str; 8] = [
    "cat", "act", "cart", "trace", "crates", "carets", "caterers", "cattle",
];

fn state_for(mode: GameMode) -> (SharedState, ChatOutbox, MemoryStore) {
    let store = MemoryStore::default();
    let settings = GameSettings {
        mode,
        single_words: vec!["rust".into()],
        ..GameSettings::default()
    };
    let mut engine = RoundEngine::with_rng(
        settings,
        Arc::new(Dictionary::from_words(WORDS)),
        Leaderboard::load(Box::new(store.clone())),
        StdRng::seed_from_u64(11),
    );
    engine.start(StartTrigger::Boot, Instant::now()).unwrap();
    if mode == GameMode::Pool {
        engine.install_puzzle(PuzzleState::LetterPool {
            letters: "caterersx".chars().collect(),
        });
    }
    let (state, outbox) = AppState::new(engine, None);
    (state, outbox, store)
}

/// Active letter-pool round over the letters `caterersx`.
pub fn pool_state() -> (SharedState, ChatOutbox, MemoryStore) {
    state_for(GameMode::Pool)
}

/// Active single-word round whose only candidate is `rust`.
pub fn single_word_state() -> (SharedState, ChatOutbox, MemoryStore) {
    state_for(GameMode::SingleWord)
}
