pub mod json_file;
#[cfg(test)]
pub mod memory;

use indexmap::IndexMap;

use crate::dao::storage::StorageResult;

/// Persisted mapping of chat identity to score, in insertion order.
pub type ScoreMap = IndexMap<String, u32>;

/// Abstraction over where the leaderboard record is persisted.
///
/// Calls are synchronous: the engine persists every award before announcing it, while
/// still holding the round lock. Implementations block the calling worker thread for the
/// duration of the write, so they must stay small and local (one file, no network).
pub trait ScoreStore: Send {
    /// Read the full record. `Ok(None)` means no record was ever written.
    fn load(&self) -> StorageResult<Option<ScoreMap>>;
    /// Replace the full record with `scores`.
    fn save(&self, scores: &ScoreMap) -> StorageResult<()>;
    /// Move a record that failed to load out of the way so the next save cannot destroy
    /// it. Returns where the old record went, if anywhere.
    fn quarantine(&self) -> StorageResult<Option<String>>;
    /// Human readable location used in logs.
    fn describe(&self) -> String;
}
