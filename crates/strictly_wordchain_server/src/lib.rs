//! Console host for the strictly_wordchain engine.
//!
//! Wires the engine to its collaborators:
//!
//! - [`WordList`]: JSON word list implementing the dictionary
//! - [`ScoreRepository`]: SQLite score ledger via Diesel
//! - [`Console`]: line commands in, rendered room events out
//! - [`ServerConfig`]: TOML configuration

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod cli;
mod config;
mod console;
mod db;
mod dictionary;
mod render;

// Crate-level exports - Command line
pub use cli::{Cli, Command};

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Console transport
pub use console::{Command as ConsoleCommand, CommandError, Console, LEADERBOARD_SIZE, help_text, rules_text};
pub use render::render;

// Crate-level exports - Persistence
pub use db::{DbError, NewScore, Score, ScoreRepository};

// Crate-level exports - Dictionary
pub use dictionary::{DictionaryError, WordList};
