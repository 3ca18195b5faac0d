use std::{io, path::PathBuf};
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by leaderboard storage backends regardless of where the record lives.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read leaderboard record `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write leaderboard record `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("leaderboard record `{path}` is not a valid score mapping")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("refusing to overwrite unreadable leaderboard record `{store}`")]
    Protected { store: String },
    #[error("failed to encode leaderboard record")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}
