//! Word acceptance rules.
//!
//! Each rule is a small precondition that either passes or names the
//! [`Rejection`]. [`LegalWord`] composes them in the order they must be
//! applied; the first failure wins.

use crate::collaborators::Dictionary;
use crate::pivot::Pivot;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::instrument;

/// Why a submission was refused. Rejections never change session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Rejection {
    /// The submitter is not the acting player.
    #[display("It's not your turn")]
    NotYourTurn,
    /// The word is shorter than the stage minimum.
    #[display("Word is too short")]
    TooShort,
    /// The dictionary does not know the word.
    #[display("Not a valid word")]
    NotAWord,
    /// The word was already played this session.
    #[display("Word was already used")]
    AlreadyUsed,
    /// The word does not satisfy the pivot.
    #[display("Word does not follow the chain")]
    ChainBroken,
}

/// Trims surrounding whitespace and lowercases.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Everything the word rules read from the session.
#[derive(Clone, Copy)]
pub struct WordContext<'a> {
    /// Current stage minimum length.
    pub min_length: usize,
    /// Word validity oracle.
    pub dictionary: &'a dyn Dictionary,
    /// Words already played.
    pub used_words: &'a HashSet<String>,
    /// Current pivot.
    pub pivot: &'a Pivot,
}

/// Precondition: the submitter is the acting player.
pub struct ActingPlayer;

impl ActingPlayer {
    /// Checks the submitter against the acting player.
    pub fn check(submitter: &PlayerId, acting: Option<&PlayerId>) -> Result<(), Rejection> {
        if acting == Some(submitter) {
            Ok(())
        } else {
            Err(Rejection::NotYourTurn)
        }
    }
}

/// Precondition: the word meets the stage minimum length.
pub struct LongEnough;

impl LongEnough {
    /// Checks the word length in characters.
    pub fn check(word: &str, ctx: &WordContext<'_>) -> Result<(), Rejection> {
        if !word.is_empty() && word.chars().count() >= ctx.min_length {
            Ok(())
        } else {
            Err(Rejection::TooShort)
        }
    }
}

/// Precondition: the dictionary knows the word.
pub struct InDictionary;

impl InDictionary {
    /// Asks the dictionary.
    pub fn check(word: &str, ctx: &WordContext<'_>) -> Result<(), Rejection> {
        if ctx.dictionary.contains(word) {
            Ok(())
        } else {
            Err(Rejection::NotAWord)
        }
    }
}

/// Precondition: the word has not been played.
pub struct Unused;

impl Unused {
    /// Checks the used-word set.
    pub fn check(word: &str, ctx: &WordContext<'_>) -> Result<(), Rejection> {
        if ctx.used_words.contains(word) {
            Err(Rejection::AlreadyUsed)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the word satisfies the mode's pivot.
pub struct PivotHolds;

impl PivotHolds {
    /// Checks the pivot constraint.
    pub fn check(word: &str, ctx: &WordContext<'_>) -> Result<(), Rejection> {
        if ctx.pivot.admits(word) {
            Ok(())
        } else {
            Err(Rejection::ChainBroken)
        }
    }
}

/// Composite precondition: all word rules, in order.
pub struct LegalWord;

impl LegalWord {
    /// Validates a normalised word.
    #[instrument(skip(ctx), fields(min_length = ctx.min_length))]
    pub fn check(word: &str, ctx: &WordContext<'_>) -> Result<(), Rejection> {
        LongEnough::check(word, ctx)?;
        InDictionary::check(word, ctx)?;
        Unused::check(word, ctx)?;
        PivotHolds::check(word, ctx)?;
        Ok(())
    }
}
