//! In-memory collaborators for unit tests.

use crate::collaborators::{Dictionary, LedgerError, ScoreLedger};
use crate::player::PlayerId;
use std::collections::HashMap;
use std::sync::Mutex;

/// Word list that samples deterministically: the first match in insertion order.
#[derive(Debug, Default)]
pub struct MemoryDictionary {
    words: Vec<String>,
}

impl MemoryDictionary {
    pub fn new<I, W>(words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }
}

impl Dictionary for MemoryDictionary {
    fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    fn sample_matching(&self, accept: &dyn Fn(&str) -> bool) -> Option<String> {
        self.words.iter().find(|w| accept(w)).cloned()
    }
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
    scores: Mutex<HashMap<PlayerId, i64>>,
}

impl ScoreLedger for MemoryLedger {
    fn credit(&self, player: &PlayerId, amount: i64) -> Result<i64, LedgerError> {
        let mut scores = self
            .scores
            .lock()
            .map_err(|_| LedgerError::new("ledger poisoned"))?;
        let total = scores.entry(player.clone()).or_insert(0);
        *total += amount;
        Ok(*total)
    }

    fn read(&self, player: &PlayerId) -> Result<i64, LedgerError> {
        let scores = self
            .scores
            .lock()
            .map_err(|_| LedgerError::new("ledger poisoned"))?;
        Ok(scores.get(player).copied().unwrap_or(0))
    }
}
