//! Game modes and the pivot each one validates submissions against.

use crate::collaborators::Dictionary;
use crate::stage::StageTable;
use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Pivot policy, selected once when a session is started.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    /// Each word starts with the last letter of the previous one.
    #[default]
    Chain,
    /// Each word contains a letter drawn fresh every turn.
    RequiredLetter,
    /// Every word starts with one letter drawn at the start of the session.
    FixedFirstLetter,
}

impl GameMode {
    /// Derives the opening pivot for a new session.
    ///
    /// Returns `None` when the dictionary cannot supply a word long enough to
    /// seed the mode.
    #[instrument(skip(dictionary, stages))]
    pub fn open(self, dictionary: &dyn Dictionary, stages: &StageTable) -> Option<Opening> {
        let first_min = stages.get(0).min_length();
        let opening = match self {
            Self::Chain => {
                let word = dictionary.sample_with_min_length(first_min)?;
                Opening {
                    pivot: Pivot::chain(&word)?,
                    starting_word: Some(word),
                }
            }
            Self::RequiredLetter => {
                let word = dictionary.sample_with_min_length(first_min)?;
                Opening {
                    pivot: Pivot::RequiredLetter {
                        letter: random_letter(&word)?,
                    },
                    starting_word: None,
                }
            }
            Self::FixedFirstLetter => {
                let word = dictionary
                    .sample_with_min_length(stages.max_min_length())
                    .or_else(|| dictionary.sample_with_min_length(first_min))?;
                Opening {
                    pivot: Pivot::FixedFirstLetter {
                        letter: word.chars().next()?,
                    },
                    starting_word: None,
                }
            }
        };
        debug!(constraint = %opening.pivot.constraint(), "Opening derived");
        Some(opening)
    }
}

/// Initial pivot and, for chain mode, the word it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opening {
    /// Pivot for the first turn.
    pub pivot: Pivot,
    /// Word shown to players as the starting word.
    pub starting_word: Option<String>,
}

/// What a submission is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Constraint {
    /// Word must start with the letter.
    #[display("starts with '{}'", _0.to_uppercase())]
    StartsWith(char),
    /// Word must contain the letter anywhere.
    #[display("contains '{}'", _0.to_uppercase())]
    Contains(char),
}

impl Constraint {
    /// Whether `word` satisfies the constraint.
    pub fn admits(&self, word: &str) -> bool {
        match *self {
            Self::StartsWith(letter) => word.starts_with(letter),
            Self::Contains(letter) => word.contains(letter),
        }
    }
}

/// Mode-specific anchor for the next submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pivot {
    /// Last accepted word and its final letter.
    Chain {
        /// The previous word.
        word: String,
        /// Its last character.
        last: char,
    },
    /// Letter the current turn's word must contain.
    RequiredLetter {
        /// The drawn letter.
        letter: char,
    },
    /// Letter every word must start with.
    FixedFirstLetter {
        /// The drawn letter.
        letter: char,
    },
}

impl Pivot {
    /// Chain pivot anchored on `word`. `None` for an empty word.
    pub fn chain(word: &str) -> Option<Self> {
        let last = word.chars().last()?;
        Some(Self::Chain {
            word: word.to_string(),
            last,
        })
    }

    /// The constraint a submission must meet.
    pub fn constraint(&self) -> Constraint {
        match *self {
            Self::Chain { last, .. } => Constraint::StartsWith(last),
            Self::RequiredLetter { letter } => Constraint::Contains(letter),
            Self::FixedFirstLetter { letter } => Constraint::StartsWith(letter),
        }
    }

    /// Whether `word` satisfies the pivot.
    pub fn admits(&self, word: &str) -> bool {
        self.constraint().admits(word)
    }

    /// Updates the pivot after `word` was accepted.
    pub fn advance(&mut self, word: &str) {
        if let Self::Chain { .. } = self
            && let Some(next) = Self::chain(word)
        {
            *self = next;
        }
    }

    /// Redraws per-turn state. Only the required-letter mode has any.
    ///
    /// Keeps the current letter if the dictionary offers nothing to draw from.
    pub fn refresh(&mut self, dictionary: &dyn Dictionary, min_length: usize) {
        if let Self::RequiredLetter { letter } = self {
            let drawn = dictionary
                .sample_with_min_length(min_length)
                .or_else(|| dictionary.sample_matching(&|_| true))
                .and_then(|word| random_letter(&word));
            if let Some(drawn) = drawn {
                *letter = drawn;
            }
        }
    }
}

fn random_letter(word: &str) -> Option<char> {
    word.chars()
        .filter(|c| c.is_alphabetic())
        .choose(&mut rand::rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use crate::testing::MemoryDictionary;
    use std::str::FromStr;

    #[test]
    fn test_mode_parses_kebab_case() {
        assert_eq!(GameMode::from_str("chain"), Ok(GameMode::Chain));
        assert_eq!(GameMode::from_str("required-letter"), Ok(GameMode::RequiredLetter));
        assert_eq!(GameMode::FixedFirstLetter.to_string(), "fixed-first-letter");
    }

    #[test]
    fn test_chain_uses_last_letter() {
        let mut pivot = Pivot::chain("cat").expect("non-empty");
        assert_eq!(pivot.constraint(), Constraint::StartsWith('t'));
        assert!(pivot.admits("toy"));
        assert!(!pivot.admits("cobra"));

        pivot.advance("toy");
        assert_eq!(pivot.constraint(), Constraint::StartsWith('y'));
    }

    #[test]
    fn test_fixed_letter_survives_acceptance() {
        let mut pivot = Pivot::FixedFirstLetter { letter: 's' };
        pivot.advance("stone");
        assert_eq!(pivot.constraint(), Constraint::StartsWith('s'));
        assert!(pivot.admits("sun"));
        assert!(!pivot.admits("moss"));
    }

    #[test]
    fn test_required_letter_matches_anywhere() {
        let pivot = Pivot::RequiredLetter { letter: 'r' };
        assert!(pivot.admits("tree"));
        assert!(pivot.admits("rain"));
        assert!(!pivot.admits("moon"));
    }

    #[test]
    fn test_refresh_draws_letter_from_dictionary_word() {
        let words = MemoryDictionary::new(["zzzz"]);
        let mut pivot = Pivot::RequiredLetter { letter: 'a' };
        pivot.refresh(&words, 3);
        assert_eq!(pivot, Pivot::RequiredLetter { letter: 'z' });
    }

    #[test]
    fn test_chain_opening_uses_first_stage_length() {
        let words = MemoryDictionary::new(["ox", "cat", "tiger"]);
        let opening = GameMode::Chain
            .open(&words, &StageTable::classic())
            .expect("opening");
        assert_eq!(opening.starting_word.as_deref(), Some("cat"));
        assert_eq!(opening.pivot.constraint(), Constraint::StartsWith('t'));
    }

    #[test]
    fn test_fixed_letter_opening_prefers_longest_stage() {
        let words = MemoryDictionary::new(["cat", "elephant"]);
        let opening = GameMode::FixedFirstLetter
            .open(&words, &StageTable::classic())
            .expect("opening");
        assert_eq!(opening.pivot, Pivot::FixedFirstLetter { letter: 'e' });
        assert_eq!(opening.starting_word, None);
    }

    #[test]
    fn test_opening_fails_without_long_enough_words() {
        let words = MemoryDictionary::new(["ox", "to"]);
        let stages = StageTable::new(vec![Stage::new(None, 3, 10)]).expect("valid");
        assert_eq!(GameMode::Chain.open(&words, &stages), None);
        assert_eq!(GameMode::RequiredLetter.open(&words, &stages), None);
        assert_eq!(GameMode::FixedFirstLetter.open(&words, &stages), None);
    }
}
