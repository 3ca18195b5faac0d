//! Cross-session leaderboard: an insertion-ordered score map persisted after every award.

use tracing::{debug, error, info, warn};

use crate::dao::{
    score_store::{ScoreMap, ScoreStore},
    storage::{StorageError, StorageResult},
};

/// One row of a ranked leaderboard view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Chat identity.
    pub user: String,
    /// Accumulated score across every round.
    pub score: u32,
}

/// Scores owned by the round engine, written through to a [`ScoreStore`].
pub struct Leaderboard {
    scores: ScoreMap,
    store: Box<dyn ScoreStore>,
    dirty: bool,
    /// Set when an unreadable record could not be moved aside; saves would destroy it.
    protected: bool,
}

impl Leaderboard {
    /// Load the persisted record from `store`.
    ///
    /// A missing record starts an empty leaderboard. An unreadable one also starts empty,
    /// but is first moved aside so later saves cannot erase it; if that fails, saving is
    /// refused for the rest of the run.
    pub fn load(store: Box<dyn ScoreStore>) -> Self {
        let mut protected = false;
        let scores = match store.load() {
            Ok(Some(scores)) => {
                info!(
                    store = %store.describe(),
                    entries = scores.len(),
                    "loaded leaderboard"
                );
                scores
            }
            Ok(None) => {
                info!(store = %store.describe(), "no leaderboard record yet; starting empty");
                ScoreMap::new()
            }
            Err(err) => {
                warn!(
                    store = %store.describe(),
                    error = %err,
                    "failed to load leaderboard; starting empty"
                );
                match store.quarantine() {
                    Ok(Some(moved_to)) => {
                        warn!(moved_to = %moved_to, "unreadable leaderboard record moved aside");
                    }
                    Ok(None) => {}
                    Err(err) => {
                        error!(
                            store = %store.describe(),
                            error = %err,
                            "could not move unreadable leaderboard aside; scores will not be saved"
                        );
                        protected = true;
                    }
                }
                ScoreMap::new()
            }
        };

        Self {
            scores,
            store,
            dirty: false,
            protected,
        }
    }

    /// Add `points` to `user`, creating the entry at zero first. Returns the new total.
    ///
    /// Only mutates memory; see [`Leaderboard::record_award`] for the write-through variant.
    pub fn credit(&mut self, user: &str, points: u32) -> u32 {
        let score = self.scores.entry(user.to_string()).or_insert(0);
        *score = score.saturating_add(points);
        self.dirty = true;
        *score
    }

    /// Persist the full mapping. On failure the in-memory scores stand and stay dirty.
    pub fn save(&mut self) -> StorageResult<()> {
        if self.protected {
            self.dirty = true;
            return Err(StorageError::Protected {
                store: self.store.describe(),
            });
        }
        match self.store.save(&self.scores) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                self.dirty = true;
                Err(err)
            }
        }
    }

    /// Credit `user` and persist immediately, logging (not propagating) persistence failures.
    pub fn record_award(&mut self, user: &str, points: u32) -> u32 {
        let total = self.credit(user, points);
        if let Err(err) = self.save() {
            warn!(
                store = %self.store.describe(),
                user = %user,
                error = %err,
                "failed to persist leaderboard; will retry on next award"
            );
        }
        total
    }

    /// Retry a save if the last one failed.
    pub fn flush(&mut self) -> StorageResult<()> {
        if !self.dirty {
            debug!("leaderboard already persisted");
            return Ok(());
        }
        self.save()
    }

    /// Whether in-memory scores differ from the last successful save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current score of `user`, if they ever scored.
    pub fn score(&self, user: &str) -> Option<u32> {
        self.scores.get(user).copied()
    }

    /// Highest `n` scores, descending. Ties keep insertion order.
    pub fn top_n(&self, n: usize) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<(&String, &u32)> = self.scores.iter().collect();
        ranked.sort_by(|(_, a), (_, b)| b.cmp(a));
        ranked
            .into_iter()
            .take(n)
            .map(|(user, score)| LeaderboardEntry {
                user: user.clone(),
                score: *score,
            })
            .collect()
    }

    /// Number of users with a score.
    pub fn len(&self) -> usize {
        self.scores.len()
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use uuid::Uuid;

    use super::*;
    use crate::dao::score_store::{json_file::JsonFileStore, memory::MemoryStore};

    #[test]
    fn credit_creates_and_accumulates() {
        let mut board = Leaderboard::load(Box::new(MemoryStore::default()));
        assert_eq!(board.credit("alice", 3), 3);
        assert_eq!(board.credit("alice", 4), 7);
        assert_eq!(board.score("alice"), Some(7));
        assert_eq!(board.score("bob"), None);
    }

    #[test]
    fn credit_save_load_round_trip_through_file() {
        let path = env::temp_dir()
            .join(format!("wordtwitch-{}", Uuid::new_v4()))
            .join("leaderboard.json");

        let mut board = Leaderboard::load(Box::new(JsonFileStore::new(&path)));
        assert_eq!(board.len(), 0);
        board.credit("carol", 11);
        board.save().unwrap();

        let reloaded = Leaderboard::load(Box::new(JsonFileStore::new(&path)));
        assert_eq!(reloaded.score("carol"), Some(11));

        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).unwrap();
        }
    }

    #[test]
    fn top_n_is_descending_and_bounded() {
        let mut board = Leaderboard::load(Box::new(MemoryStore::default()));
        for (user, score) in [
            ("a", 3),
            ("b", 9),
            ("c", 1),
            ("d", 7),
            ("e", 7),
            ("f", 12),
            ("g", 5),
        ] {
            board.credit(user, score);
        }

        let top = board.top_n(5);
        assert_eq!(top.len(), 5);
        assert!(top.windows(2).all(|pair| pair[0].score >= pair[1].score));
        let users: Vec<&str> = top.iter().map(|entry| entry.user.as_str()).collect();
        assert_eq!(users, vec!["f", "b", "d", "e", "g"]);

        assert_eq!(board.top_n(50).len(), 7);
    }

    #[test]
    fn failed_save_keeps_score_and_retries_on_next_award() {
        let store = MemoryStore::default();
        let mut board = Leaderboard::load(Box::new(store.clone()));

        store.set_fail_writes(true);
        assert_eq!(board.record_award("dave", 5), 5);
        assert!(board.is_dirty());
        assert!(store.record().is_none());

        store.set_fail_writes(false);
        board.record_award("erin", 1);
        assert!(!board.is_dirty());
        let saved = store.record().unwrap();
        assert_eq!(saved.get("dave"), Some(&5));
        assert_eq!(saved.get("erin"), Some(&1));
    }

    #[test]
    fn flush_only_writes_when_dirty() {
        let store = MemoryStore::default();
        let mut board = Leaderboard::load(Box::new(store.clone()));
        board.flush().unwrap();
        assert_eq!(store.save_count(), 0);

        board.credit("frank", 2);
        board.flush().unwrap();
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn corrupt_record_survives_the_next_award() {
        let dir = env::temp_dir().join(format!("wordtwitch-{}", Uuid::new_v4()));
        let path = dir.join("leaderboard.json");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, r#"{"alice":120,"bob":75,}"#).unwrap();

        let mut board = Leaderboard::load(Box::new(JsonFileStore::new(&path)));
        assert_eq!(board.len(), 0);
        assert_eq!(board.record_award("carol", 3), 3);
        assert!(!board.is_dirty());

        let kept: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|entry| entry != &path)
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(
            std::fs::read_to_string(&kept[0]).unwrap(),
            r#"{"alice":120,"bob":75,}"#
        );
        let reloaded = Leaderboard::load(Box::new(JsonFileStore::new(&path)));
        assert_eq!(reloaded.score("carol"), Some(3));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn unmovable_corrupt_record_is_never_overwritten() {
        let mut scores = ScoreMap::new();
        scores.insert("alice".into(), 120);
        let store = MemoryStore::with_scores(scores.clone());
        store.set_fail_reads(true);

        let mut board = Leaderboard::load(Box::new(store.clone()));
        assert_eq!(board.record_award("carol", 3), 3);
        assert!(board.is_dirty());
        assert!(matches!(board.flush(), Err(StorageError::Protected { .. })));
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.record(), Some(scores));
    }

    #[test]
    fn existing_record_is_loaded() {
        let mut scores = ScoreMap::new();
        scores.insert("gina".into(), 40);
        let board = Leaderboard::load(Box::new(MemoryStore::with_scores(scores)));
        assert_eq!(board.score("gina"), Some(40));
    }
}
