//! Difficulty stages and round parameter derivation.
//!
//! A [`StageTable`] is an ordered list of [`Stage`]s. Sessions advance through
//! it as words are accepted; the final stage has no quota and is never left.

use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

/// One difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Stage {
    /// Words to accept before advancing. `None` means the stage never ends.
    quota: Option<u32>,
    /// Minimum word length, in characters.
    min_length: usize,
    /// Seconds the acting player has to answer.
    timeout_secs: u64,
}

impl Stage {
    /// Words required to leave this stage, if bounded.
    pub fn quota(&self) -> Option<u32> {
        self.quota
    }

    /// Minimum accepted word length.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Turn timeout in whole seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Turn timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Reasons a stage table is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum StageTableError {
    /// The table has no stages.
    #[display("Stage table must contain at least one stage")]
    Empty,

    /// A stage allows zero-length words.
    #[display("Stage {} has a minimum length of zero", stage)]
    ZeroMinLength {
        /// 1-based stage number.
        stage: usize,
    },

    /// A stage gives the player no time.
    #[display("Stage {} has a timeout of zero", stage)]
    ZeroTimeout {
        /// 1-based stage number.
        stage: usize,
    },

    /// A non-terminal stage has no quota or a zero quota.
    #[display("Stage {} must have a positive quota", stage)]
    InvalidQuota {
        /// 1-based stage number.
        stage: usize,
    },

    /// The terminal stage has a quota.
    #[display("The last stage must have no quota")]
    BoundedTerminal,
}

/// Ordered, validated sequence of stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTable {
    stages: Vec<Stage>,
}

impl StageTable {
    /// Validates and builds a stage table.
    ///
    /// # Errors
    ///
    /// Returns [`StageTableError`] if the table is empty, any stage has a zero
    /// length or timeout, a non-terminal stage lacks a positive quota, or the
    /// terminal stage is bounded.
    #[instrument(skip(stages), fields(count = stages.len()))]
    pub fn new(stages: Vec<Stage>) -> Result<Self, StageTableError> {
        let Some(last) = stages.len().checked_sub(1) else {
            return Err(StageTableError::Empty);
        };

        for (index, stage) in stages.iter().enumerate() {
            let number = index + 1;
            if stage.min_length == 0 {
                return Err(StageTableError::ZeroMinLength { stage: number });
            }
            if stage.timeout_secs == 0 {
                return Err(StageTableError::ZeroTimeout { stage: number });
            }
            if index == last {
                if stage.quota.is_some() {
                    return Err(StageTableError::BoundedTerminal);
                }
            } else if !matches!(stage.quota, Some(q) if q > 0) {
                return Err(StageTableError::InvalidQuota { stage: number });
            }
        }

        Ok(Self { stages })
    }

    /// The five-stage table the classic game ships with.
    pub fn classic() -> Self {
        Self {
            stages: vec![
                Stage::new(Some(5), 3, 35),
                Stage::new(Some(5), 4, 30),
                Stage::new(Some(5), 5, 25),
                Stage::new(Some(5), 6, 20),
                Stage::new(None, 7, 15),
            ],
        }
    }

    /// Returns the stage at `index`, clamped to the terminal stage.
    pub fn get(&self, index: usize) -> &Stage {
        &self.stages[self.clamp(index)]
    }

    /// Clamps an index into the table.
    pub fn clamp(&self, index: usize) -> usize {
        index.min(self.last_index())
    }

    /// Index of the terminal stage.
    pub fn last_index(&self) -> usize {
        self.stages.len() - 1
    }

    /// Largest minimum length across all stages.
    pub fn max_min_length(&self) -> usize {
        self.stages
            .iter()
            .map(Stage::min_length)
            .max()
            .unwrap_or(1)
    }

    /// All stages in order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Round parameters for the given stage index.
    pub fn round_params(&self, index: usize) -> RoundParams {
        let index = self.clamp(index);
        let stage = self.stages[index];
        RoundParams {
            stage_number: index + 1,
            min_length: stage.min_length,
            timeout_secs: stage.timeout_secs,
            quota: stage.quota,
        }
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self::classic()
    }
}

/// Parameters for one turn, derived from the current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundParams {
    /// 1-based stage number.
    pub stage_number: usize,
    /// Minimum accepted word length.
    pub min_length: usize,
    /// Turn timeout in seconds.
    pub timeout_secs: u64,
    /// Words required to leave the stage, if bounded.
    pub quota: Option<u32>,
}

impl RoundParams {
    /// Turn timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_table_is_valid() {
        let classic = StageTable::classic();
        assert_eq!(StageTable::new(classic.stages().to_vec()), Ok(classic));
    }

    #[test]
    fn test_lookup_clamps_past_terminal_stage() {
        let table = StageTable::classic();
        assert_eq!(table.get(4), table.get(40));
        assert_eq!(table.round_params(99).stage_number, 5);
        assert_eq!(table.round_params(99).min_length, 7);
        assert_eq!(table.round_params(99).quota, None);
    }

    #[test]
    fn test_round_params_follow_stage() {
        let table = StageTable::classic();
        let params = table.round_params(1);
        assert_eq!(params.stage_number, 2);
        assert_eq!(params.min_length, 4);
        assert_eq!(params.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_rejects_empty_table() {
        assert_eq!(StageTable::new(vec![]), Err(StageTableError::Empty));
    }

    #[test]
    fn test_rejects_bounded_terminal_stage() {
        let result = StageTable::new(vec![Stage::new(Some(3), 3, 10)]);
        assert_eq!(result, Err(StageTableError::BoundedTerminal));
    }

    #[test]
    fn test_rejects_unbounded_middle_stage() {
        let result = StageTable::new(vec![Stage::new(None, 3, 10), Stage::new(None, 4, 10)]);
        assert_eq!(result, Err(StageTableError::InvalidQuota { stage: 1 }));
    }

    #[test]
    fn test_rejects_zero_timeout_and_length() {
        assert_eq!(
            StageTable::new(vec![Stage::new(None, 0, 10)]),
            Err(StageTableError::ZeroMinLength { stage: 1 })
        );
        assert_eq!(
            StageTable::new(vec![Stage::new(Some(2), 3, 10), Stage::new(None, 3, 0)]),
            Err(StageTableError::ZeroTimeout { stage: 2 })
        );
    }

    #[test]
    fn test_max_min_length() {
        assert_eq!(StageTable::classic().max_min_length(), 7);
    }
}
