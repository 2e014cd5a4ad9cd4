//! Server configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use strictly_wordchain::{EngineConfig, GameMode, PlayerId, Stage, StageTable};
use tracing::{debug, info, instrument};

/// Host configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// JSON word list.
    words_path: PathBuf,

    /// SQLite score database.
    database_path: String,

    /// Seconds a new game accepts joins.
    join_window_secs: u64,

    /// Players required to start (never below two).
    min_players: usize,

    /// Optional roster cap.
    max_players: Option<usize>,

    /// Points credited to a winner.
    win_reward: i64,

    /// Mode used when `start` names none.
    default_mode: GameMode,

    /// Actor ids allowed to force-end games.
    admins: Vec<String>,

    /// How long automated players think before answering.
    automaton_think_ms: u64,

    /// Custom stage table; the classic table when absent.
    stages: Option<Vec<Stage>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            words_path: PathBuf::from("words.json"),
            database_path: "wordchain.db".to_string(),
            join_window_secs: 60,
            min_players: 2,
            max_players: None,
            win_reward: 10,
            default_mode: GameMode::Chain,
            admins: Vec::new(),
            automaton_think_ms: 1500,
            stages: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file, using defaults");
            return Ok(Self::default());
        }

        debug!("Loading config from file");
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not a valid configuration.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(mode = %config.default_mode, admins = config.admins.len(), "Config loaded");
        Ok(config)
    }

    /// Builds the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an invalid stage table, a zero join window,
    /// or a roster cap below the minimum.
    #[instrument(skip(self))]
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        if self.join_window_secs == 0 {
            return Err(ConfigError::new("join_window_secs must be positive"));
        }

        let stages = match &self.stages {
            Some(stages) => StageTable::new(stages.clone())
                .map_err(|e| ConfigError::new(format!("Invalid stages: {}", e)))?,
            None => StageTable::classic(),
        };

        let mut config = EngineConfig::default()
            .with_join_window(Duration::from_secs(self.join_window_secs))
            .with_min_players(self.min_players)
            .with_win_reward(self.win_reward)
            .with_stages(stages);

        if let Some(max) = self.max_players {
            if max < config.required_players() {
                return Err(ConfigError::new(format!(
                    "max_players ({}) is below the required {}",
                    max,
                    config.required_players()
                )));
            }
            config = config.with_max_players(max);
        }
        Ok(config)
    }

    /// Think time for automated players.
    pub fn automaton_think(&self) -> Duration {
        Duration::from_millis(self.automaton_think_ms)
    }

    /// Whether `actor` may force-end games.
    pub fn is_admin(&self, actor: &PlayerId) -> bool {
        self.admins.iter().any(|admin| admin == actor.as_str())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
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
