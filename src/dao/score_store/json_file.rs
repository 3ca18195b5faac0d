//! Flat JSON file holding the whole leaderboard, rewritten wholesale on every save.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use time::OffsetDateTime;

use crate::dao::{
    score_store::{ScoreMap, ScoreStore},
    storage::{StorageError, StorageResult},
};

/// Score store backed by a single pretty-printed JSON object `{ "user": score }`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store targeting `path`. Nothing is touched on disk until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling file written first and then renamed over the record.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "leaderboard.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Sibling name an unreadable record is moved to, stamped with the unix time.
    fn quarantine_path(&self, unix_seconds: i64) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "leaderboard.json".into());
        name.push(format!(".corrupt-{unix_seconds}"));
        self.path.with_file_name(name)
    }

    fn write_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&self) -> StorageResult<Option<ScoreMap>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str::<ScoreMap>(&contents)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, scores: &ScoreMap) -> StorageResult<()> {
        let payload =
            serde_json::to_string_pretty(scores).map_err(|source| StorageError::Encode { source })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| Self::write_error(parent, source))?;
            }
        }

        let staging = self.staging_path();
        fs::write(&staging, payload).map_err(|source| Self::write_error(&staging, source))?;
        fs::rename(&staging, &self.path).map_err(|source| Self::write_error(&self.path, source))
    }

    fn quarantine(&self) -> StorageResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let target = self.quarantine_path(OffsetDateTime::now_utc().unix_timestamp());
        fs::rename(&self.path, &target).map_err(|source| Self::write_error(&target, source))?;
        Ok(Some(target.display().to_string()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use uuid::Uuid;

    use super::*;

    fn temp_store() -> (JsonFileStore, PathBuf) {
        let dir = env::temp_dir().join(format!("wordtwitch-{}", Uuid::new_v4()));
        let path = dir.join("leaderboard.json");
        (JsonFileStore::new(&path), dir)
    }

    #[test]
    fn missing_record_loads_as_none() {
        let (store, _dir) = temp_store();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_overwrites_whole_record() {
        let (store, dir) = temp_store();

        let mut scores = ScoreMap::new();
        scores.insert("alice".into(), 4);
        scores.insert("bob".into(), 9);
        store.save(&scores).unwrap();

        scores.shift_remove("bob");
        scores.insert("alice".into(), 6);
        store.save(&scores).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("alice"), Some(&6));
        assert!(!store.staging_path().exists());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn corrupt_record_is_a_decode_error() {
        let (store, dir) = temp_store();
        fs::create_dir_all(&dir).unwrap();
        fs::write(&store.path, "[1, 2, 3]").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, StorageError::Decode { .. }));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn quarantine_moves_record_aside() {
        let (store, dir) = temp_store();
        fs::create_dir_all(&dir).unwrap();
        fs::write(&store.path, "{\"alice\":120,}").unwrap();

        let moved = store.quarantine().unwrap().unwrap();
        assert!(!store.path.exists());
        assert!(moved.contains("leaderboard.json.corrupt-"));
        assert_eq!(fs::read_to_string(&moved).unwrap(), "{\"alice\":120,}");
        assert!(store.quarantine().unwrap().is_none());

        fs::remove_dir_all(dir).unwrap();
    }
}
