//! Strictly Wordchain - turn-based elimination word-chain engine
//!
//! One [`Engine`] runs any number of concurrent sessions, one per room. Each
//! session moves `Forming -> Active -> Ended`: players join during a timed
//! join window, then take turns submitting words under a per-turn deadline.
//! Missing a deadline eliminates the player; the last player standing wins.
//!
//! # Architecture
//!
//! - **Stage table**: difficulty tiers (quota, minimum length, timeout)
//! - **Pivot**: chain, required-letter and fixed-first-letter modes
//! - **Rules**: the ordered word acceptance pipeline
//! - **Session**: the state machine, mutated only under its own lock
//! - **Registry**: room to session mapping
//! - **Scheduler**: cancellable deadlines with stale-fire revalidation
//!
//! The dictionary and the score ledger are injected as trait objects; all
//! output leaves the engine as [`RoomEvent`]s on an unbounded channel.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_wordchain::{
//!     Dictionary, Engine, EngineConfig, GameMode, LedgerError, Player, PlayerId, RoomId,
//!     ScoreLedger, Seat,
//! };
//!
//! struct Words;
//! impl Dictionary for Words {
//!     fn contains(&self, word: &str) -> bool { word == "cat" }
//!     fn sample_matching(&self, accept: &dyn Fn(&str) -> bool) -> Option<String> {
//!         accept("cat").then(|| "cat".to_string())
//!     }
//! }
//!
//! struct NoScores;
//! impl ScoreLedger for NoScores {
//!     fn credit(&self, _: &PlayerId, amount: i64) -> Result<i64, LedgerError> { Ok(amount) }
//!     fn read(&self, _: &PlayerId) -> Result<i64, LedgerError> { Ok(0) }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let engine = Engine::new(EngineConfig::default(), Arc::new(Words), Arc::new(NoScores), tx);
//!
//! let room = RoomId::from("lobby");
//! engine.request_start(room.clone(), GameMode::Chain).await?;
//! engine.request_join(&room, Seat::human(Player::new("alice", "Alice"))).await?;
//!
//! while let Some(event) = rx.recv().await {
//!     println!("{:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod collaborators;
mod config;
mod engine;
mod error;
mod event;
mod invariants;
mod pivot;
mod player;
mod registry;
mod rules;
mod scheduler;
mod session;
mod stage;

#[cfg(test)]
mod testing;

// Crate-level exports - Collaborator interfaces
pub use collaborators::{Dictionary, LedgerError, ScoreLedger};

// Crate-level exports - Configuration
pub use config::{EngineConfig, MIN_PLAYERS};

// Crate-level exports - Engine facade
pub use engine::{Engine, Verdict};

// Crate-level exports - Errors and events
pub use error::EngineError;
pub use event::{CancelReason, GameEvent, RoomEvent};

// Crate-level exports - Invariants
pub use invariants::{
    HistoryMatchesUsedWords, Invariant, InvariantSet, InvariantViolation, SessionInvariants,
    SingleActingDeadline, StageWithinTable, TurnIndexInBounds,
};

// Crate-level exports - Game modes and rules
pub use pivot::{Constraint, GameMode, Opening, Pivot};
pub use rules::{
    ActingPlayer, InDictionary, LegalWord, LongEnough, PivotHolds, Rejection, Unused, WordContext,
    normalize,
};

// Crate-level exports - Players
pub use player::{Automaton, Human, Player, PlayerId, PlayerKind, Seat, TurnPrompt, TurnTaker};

// Crate-level exports - Sessions and scheduling
pub use registry::{SessionHandle, SessionRegistry};
pub use scheduler::{Deadline, DeadlineTag};
pub use session::{Acceptance, Elimination, Lifecycle, RoomId, Session, SessionId, SessionSnapshot};

// Crate-level exports - Stages
pub use stage::{RoundParams, Stage, StageTable, StageTableError};
