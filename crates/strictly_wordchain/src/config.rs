//! Engine tunables.

use crate::stage::StageTable;
use derive_getters::Getters;
use derive_setters::Setters;
use std::time::Duration;

/// Minimum roster size the engine will ever start a game with.
pub const MIN_PLAYERS: usize = 2;

/// Engine configuration, built with `with_*` setters over [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct EngineConfig {
    /// How long a new session accepts joins.
    join_window: Duration,
    /// Players required when the join window closes (never below two).
    min_players: usize,
    /// Optional roster cap.
    #[setters(strip_option)]
    max_players: Option<usize>,
    /// Points credited to the winner.
    win_reward: i64,
    /// Difficulty progression.
    stages: StageTable,
}

impl EngineConfig {
    /// Players actually required to start.
    pub fn required_players(&self) -> usize {
        self.min_players.max(MIN_PLAYERS)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            join_window: Duration::from_secs(60),
            min_players: MIN_PLAYERS,
            max_players: None,
            win_reward: 10,
            stages: StageTable::classic(),
        }
    }
}
