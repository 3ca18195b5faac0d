//! Word list backing guess validation and letter-pool seeding.

use std::{collections::HashSet, fs, io::ErrorKind, path::Path};

use tracing::{info, warn};

/// Shortest dictionary word allowed to seed a letter pool.
pub const SEED_MIN_LEN: usize = 5;
/// Longest dictionary word allowed to seed a letter pool.
pub const SEED_MAX_LEN: usize = 12;

/// Immutable set of lowercase words loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
    /// Pool seeds, filtered once and sorted so seeded generators pick reproducibly.
    seeds: Vec<String>,
}

impl Dictionary {
    /// Load a newline-delimited word list.
    ///
    /// A missing or unreadable file yields an empty dictionary; pool rounds then fall back
    /// to frequency-drawn letters.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let dictionary = Self::from_words(contents.lines());
                info!(
                    path = %path.display(),
                    count = dictionary.len(),
                    "loaded dictionary"
                );
                dictionary
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "dictionary file not found; continuing with an empty dictionary"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read dictionary; continuing with an empty dictionary"
                );
                Self::default()
            }
        }
    }

    /// Build a dictionary from raw entries, trimming, lowercasing and skipping blanks.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: HashSet<String> = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        let mut seeds: Vec<String> = words
            .iter()
            .filter(|word| is_seed(word))
            .cloned()
            .collect();
        seeds.sort_unstable();
        Self { words, seeds }
    }

    /// Whether `word` (already lowercase) is a known word.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Words eligible to seed a letter pool: alphabetic and 5 to 12 letters long.
    pub fn seed_candidates(&self) -> &[String] {
        &self.seeds
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether no words were loaded.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn is_seed(word: &str) -> bool {
    let len = word.chars().count();
    (SEED_MIN_LEN..=SEED_MAX_LEN).contains(&len) && word.chars().all(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use std::env;

    use uuid::Uuid;

    use super::*;

    #[test]
    fn entries_are_normalised() {
        let dictionary = Dictionary::from_words(["  Stream ", "", "OVERLAY", "chat"]);
        assert_eq!(dictionary.len(), 3);
        assert!(dictionary.contains("stream"));
        assert!(dictionary.contains("overlay"));
        assert!(!dictionary.contains("Stream"));
    }

    #[test]
    fn seed_candidates_filter_by_length_and_letters() {
        let dictionary =
            Dictionary::from_words(["cat", "planet", "don't", "abcdefghijklm", "twelveletter"]);
        assert_eq!(dictionary.seed_candidates(), ["planet", "twelveletter"]);
    }

    #[test]
    fn seed_candidates_are_computed_once() {
        let dictionary = Dictionary::from_words(["stream", "overlay", "cat"]);
        let first = dictionary.seed_candidates();
        let second = dictionary.seed_candidates();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first, ["overlay", "stream"]);
    }

    #[test]
    fn missing_file_yields_empty_dictionary() {
        let path = env::temp_dir().join(format!("missing-{}.txt", Uuid::new_v4()));
        let dictionary = Dictionary::load(&path);
        assert!(dictionary.is_empty());
    }

    #[test]
    fn load_reads_one_word_per_line() {
        let path = env::temp_dir().join(format!("words-{}.txt", Uuid::new_v4()));
        fs::write(&path, "alpha\nBeta\n\ngamma\r\n").unwrap();
        let dictionary = Dictionary::load(&path);
        fs::remove_file(&path).unwrap();
        assert_eq!(dictionary.len(), 3);
        assert!(dictionary.contains("beta"));
        assert!(dictionary.contains("gamma"));
    }
}
