/// Word list loading and lookups.
pub mod dictionary;
/// In-memory leaderboard with write-through persistence.
pub mod leaderboard;
/// Persistence backends for the leaderboard record.
pub mod score_store;
/// Storage error types shared by every backend.
pub mod storage;
