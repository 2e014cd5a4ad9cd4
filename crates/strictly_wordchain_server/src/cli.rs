//! Command-line interface for the word chain host.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Wordchain - turn-based elimination word game
#[derive(Parser, Debug)]
#[command(name = "strictly_wordchain")]
#[command(about = "Host word chain games from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "wordchain.toml")]
    pub config: PathBuf,

    /// Log filter, overrides RUST_LOG
    #[arg(long)]
    pub log_level: Option<String>,

    /// Subcommand to run (defaults to `play`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Host games on the console
    Play,

    /// Show a player's score and rank
    Score {
        /// Player id
        player: String,
    },

    /// Show the top players
    Leaderboard {
        /// Number of entries
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },

    /// Delete every stored score
    ResetScores,
}
