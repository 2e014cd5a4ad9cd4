//! Word list dictionary loaded from JSON.

use derive_more::{Display, Error};
use rand::seq::IteratorRandom;
use std::collections::HashSet;
use std::path::Path;
use strictly_wordchain::{Dictionary, normalize};
use tracing::{info, instrument};

/// Dictionary loading error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Dictionary error: {} at {}:{}", message, file, line)]
pub struct DictionaryError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DictionaryError {
    /// Creates a new dictionary error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Normalised set of valid words.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    lookup: HashSet<String>,
    words: Vec<String>,
}

impl WordList {
    /// Builds a word list, normalising and de-duplicating entries.
    pub fn new<I, W>(words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        let mut list = Self::default();
        for word in words {
            let word = normalize(word.as_ref());
            if !word.is_empty() && list.lookup.insert(word.clone()) {
                list.words.push(word);
            }
        }
        list
    }

    /// Parses a JSON array of strings.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError`] if the JSON is not an array of strings or
    /// contains no usable words.
    #[instrument(skip(json))]
    pub fn from_json(json: &str) -> Result<Self, DictionaryError> {
        let raw: Vec<String> = serde_json::from_str(json)
            .map_err(|e| DictionaryError::new(format!("Invalid word list: {}", e)))?;
        let list = Self::new(raw);
        if list.is_empty() {
            return Err(DictionaryError::new("Word list contains no words"));
        }
        Ok(list)
    }

    /// Loads a JSON word list from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DictionaryError::new(format!("Failed to read word list: {}", e)))?;
        let list = Self::from_json(&content)?;
        info!(words = list.len(), "Word list loaded");
        Ok(list)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn contains(&self, word: &str) -> bool {
        self.lookup.contains(word)
    }

    fn sample_matching(&self, accept: &dyn Fn(&str) -> bool) -> Option<String> {
        self.words
            .iter()
            .filter(|word| accept(word.as_str()))
            .choose(&mut rand::rng())
            .cloned()
    }
}
