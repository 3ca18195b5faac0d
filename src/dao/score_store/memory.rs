//! In-memory score store used by tests, with switchable write failures.

use std::{
    io,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use crate::dao::{
    score_store::{ScoreMap, ScoreStore},
    storage::{StorageError, StorageResult},
};

/// Cloneable handle: clones share the same record so tests can inspect what was saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Arc<Mutex<Option<ScoreMap>>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Store preloaded with `scores`.
    pub fn with_scores(scores: ScoreMap) -> Self {
        let store = Self::default();
        *store.record.lock().unwrap() = Some(scores);
        store
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make loads fail as if the record were corrupt and cannot be moved aside.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Last successfully saved record.
    pub fn record(&self) -> Option<ScoreMap> {
        self.record.lock().unwrap().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> StorageResult<Option<ScoreMap>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Read {
                path: PathBuf::from("memory"),
                source: io::Error::other("simulated read failure"),
            });
        }
        Ok(self.record.lock().unwrap().clone())
    }

    fn save(&self, scores: &ScoreMap) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                path: PathBuf::from("memory"),
                source: io::Error::other("simulated write failure"),
            });
        }
        *self.record.lock().unwrap() = Some(scores.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn quarantine(&self) -> StorageResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                path: PathBuf::from("memory"),
                source: io::Error::other("simulated rename failure"),
            });
        }
        Ok(None)
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}
