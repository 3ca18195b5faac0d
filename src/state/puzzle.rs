//! Puzzle generation for both game modes and the letter-pool formability check.

use std::collections::HashMap;

use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};
use serde::Deserialize;

use crate::dao::dictionary::Dictionary;

/// Letters ordered by English frequency, used to pad pools and as the empty-dictionary fallback.
const LETTER_FREQUENCY: &[u8] = b"etaoinshrdlcumwfgypbvkjxqz";
/// Rare letters written over random pool positions as decoys.
const DECOY_LETTERS: &[u8] = b"zxqj";
/// Placeholder shown for every hidden letter of a single-word target.
pub const MASK_PLACEHOLDER: char = '_';
/// Used only when the configured candidate list is somehow empty.
const FALLBACK_SINGLE_WORD: &str = "guess";

/// Which flavour of game the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Players form dictionary words from a shared shuffled letter pool during timed rounds.
    Pool,
    /// Players guess one hidden target word; a new word follows every correct guess.
    SingleWord,
}

/// Guessable surface of the current round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleState {
    /// One hidden target word, shown as its first letter followed by placeholders.
    SingleWord {
        /// Lowercase word players must guess exactly.
        target: String,
        /// Same length as `target`; only the first character is revealed.
        mask: String,
    },
    /// Shuffled letters players draw from to form words.
    LetterPool {
        /// Pool letters in display order. Order carries no meaning for formability.
        letters: Vec<char>,
    },
}

/// Pick a target uniformly from `candidates` and mask everything but its first letter.
pub fn new_single_word<R: Rng + ?Sized>(candidates: &[String], rng: &mut R) -> PuzzleState {
    let target = candidates
        .choose(rng)
        .map(|word| word.to_lowercase())
        .unwrap_or_else(|| FALLBACK_SINGLE_WORD.to_string());

    let mut chars = target.chars();
    let mask = match chars.next() {
        Some(first) => std::iter::once(first)
            .chain(chars.map(|_| MASK_PLACEHOLDER))
            .collect(),
        None => String::new(),
    };

    PuzzleState::SingleWord { target, mask }
}

/// Build a shuffled letter pool seeded from a random dictionary word.
///
/// The seed is padded with frequency-weighted letters up to `pool_size`, then `fake_count`
/// random positions are overwritten with rare decoy letters. Decoys may land on a position
/// holding the same letter, or on a seed letter, so a decoy position can still help form
/// words. Without any 5 to 12 letter dictionary word the pool is drawn entirely from the
/// frequency table.
pub fn new_letter_pool<R: Rng + ?Sized>(
    dictionary: &Dictionary,
    pool_size: usize,
    fake_count: usize,
    rng: &mut R,
) -> PuzzleState {
    let candidates = dictionary.seed_candidates();

    let Some(seed) = candidates.choose(rng) else {
        let letters = (0..pool_size)
            .map(|_| random_letter(LETTER_FREQUENCY, rng))
            .collect();
        return PuzzleState::LetterPool { letters };
    };

    let mut letters: Vec<char> = seed.chars().collect();
    while letters.len() < pool_size {
        letters.push(random_letter(LETTER_FREQUENCY, rng));
    }

    if !letters.is_empty() {
        for _ in 0..fake_count {
            let position = rng.random_range(0..letters.len());
            letters[position] = random_letter(DECOY_LETTERS, rng);
        }
    }

    letters.shuffle(rng);
    PuzzleState::LetterPool { letters }
}

/// Whether `word` can be spelled using each pool letter at most once.
pub fn can_form(word: &str, pool: &[char]) -> bool {
    let mut available: HashMap<char, usize> = HashMap::with_capacity(pool.len());
    for letter in pool {
        *available.entry(*letter).or_default() += 1;
    }

    word.chars().all(|ch| match available.get_mut(&ch) {
        Some(count) if *count > 0 => {
            *count -= 1;
            true
        }
        _ => false,
    })
}

fn random_letter<R: Rng + ?Sized>(alphabet: &[u8], rng: &mut R) -> char {
    char::from(alphabet[rng.random_range(0..alphabet.len())])
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn can_form_is_multiset_containment() {
        let pool = ['t', 'a', 'c', 'x'];
        assert!(can_form("cat", &pool));
        assert!(can_form("act", &pool));
        assert!(!can_form("cats", &pool));
        assert!(!can_form("tact", &pool));
    }

    #[test]
    fn can_form_respects_repeated_letters() {
        let pool = ['l', 'e', 'l', 'v', 'e'];
        assert!(can_form("level", &['l', 'e', 'v', 'e', 'l']));
        assert!(!can_form("level", &pool[..4]));
        assert!(can_form("", &pool));
    }

    #[test]
    fn single_word_mask_reveals_only_first_letter() {
        let candidates = vec!["Overlay".to_string()];
        let puzzle = new_single_word(&candidates, &mut rng());
        match puzzle {
            PuzzleState::SingleWord { target, mask } => {
                assert_eq!(target, "overlay");
                assert_eq!(mask, "o______");
                assert_eq!(mask.chars().count(), target.chars().count());
            }
            other => panic!("expected single word puzzle, got {other:?}"),
        }
    }

    #[test]
    fn single_word_falls_back_on_empty_candidates() {
        let puzzle = new_single_word(&[], &mut rng());
        assert_eq!(
            puzzle,
            PuzzleState::SingleWord {
                target: "guess".into(),
                mask: "g____".into(),
            }
        );
    }

    #[test]
    fn letter_pool_contains_seed_word_letters() {
        let dictionary = Dictionary::from_words(["planet"]);
        let puzzle = new_letter_pool(&dictionary, 9, 0, &mut rng());
        let PuzzleState::LetterPool { letters } = puzzle else {
            panic!("expected letter pool");
        };
        assert_eq!(letters.len(), 9);
        assert!(can_form("planet", &letters));
    }

    #[test]
    fn letter_pool_keeps_long_seed_whole() {
        let dictionary = Dictionary::from_words(["streamers"]);
        let PuzzleState::LetterPool { letters } = new_letter_pool(&dictionary, 5, 0, &mut rng())
        else {
            panic!("expected letter pool");
        };
        assert_eq!(letters.len(), 9);
        assert!(can_form("streamers", &letters));
    }

    #[test]
    fn letter_pool_decoys_come_from_rare_set() {
        let dictionary = Dictionary::from_words(["abcdefgh"]);
        let PuzzleState::LetterPool { letters } = new_letter_pool(&dictionary, 8, 3, &mut rng())
        else {
            panic!("expected letter pool");
        };
        assert_eq!(letters.len(), 8);
        let foreign = letters
            .iter()
            .filter(|c| !"abcdefgh".contains(**c))
            .count();
        assert!(foreign <= 3);
        assert!(
            letters
                .iter()
                .filter(|c| !"abcdefgh".contains(**c))
                .all(|c| "zxqj".contains(*c))
        );
    }

    #[test]
    fn letter_pool_falls_back_without_candidates() {
        let dictionary = Dictionary::from_words(["cat", "dog"]);
        let PuzzleState::LetterPool { letters } = new_letter_pool(&dictionary, 9, 1, &mut rng())
        else {
            panic!("expected letter pool");
        };
        assert_eq!(letters.len(), 9);
        assert!(letters.iter().all(|c| c.is_ascii_lowercase()));
    }
}
