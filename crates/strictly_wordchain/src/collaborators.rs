//! Interfaces to the systems the engine consumes but does not own.

use crate::player::PlayerId;
use derive_more::{Display, Error};
use tracing::instrument;

/// Set-membership oracle for word validity.
pub trait Dictionary: Send + Sync {
    /// Whether `word` (already normalised to lowercase) is a valid word.
    fn contains(&self, word: &str) -> bool;

    /// Returns a random word for which `accept` holds, if any exists.
    fn sample_matching(&self, accept: &dyn Fn(&str) -> bool) -> Option<String>;

    /// Returns a random word of at least `min_length` characters.
    fn sample_with_min_length(&self, min_length: usize) -> Option<String> {
        self.sample_matching(&|word| word.chars().count() >= min_length)
    }
}

/// Persistent per-player score counter.
pub trait ScoreLedger: Send + Sync {
    /// Adds `amount` to the player's score and returns the new total.
    fn credit(&self, player: &PlayerId, amount: i64) -> Result<i64, LedgerError>;

    /// Reads the player's score (zero when unknown).
    fn read(&self, player: &PlayerId) -> Result<i64, LedgerError>;
}

/// Score ledger failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Ledger error: {} at {}:{}", message, file, line)]
pub struct LedgerError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LedgerError {
    /// Creates a new ledger error with caller location tracking.
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
