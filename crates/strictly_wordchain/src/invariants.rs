//! First-class session invariants.
//!
//! Invariants are logical properties that hold after every turn transition.
//! They are checked in debug builds and can be tested independently.

use crate::session::{Lifecycle, Session};
use std::collections::HashSet;
use tracing::warn;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{}", description)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants checked together. Implemented for tuples.
pub trait InvariantSet<S> {
    /// Checks all invariants, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! impl_invariant_set {
    ($($inv:ident),+) => {
        impl<S, $($inv),+> InvariantSet<S> for ($($inv,)+)
        where
            $($inv: Invariant<S>,)+
        {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let mut violations = Vec::new();
                $(
                    if !$inv::holds(state) {
                        violations.push(InvariantViolation::new($inv::description()));
                    }
                )+
                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(violations)
                }
            }
        }
    };
}

impl_invariant_set!(I1, I2);
impl_invariant_set!(I1, I2, I3);
impl_invariant_set!(I1, I2, I3, I4);

/// While active, the turn index addresses a seated player.
pub struct TurnIndexInBounds;

impl Invariant<Session> for TurnIndexInBounds {
    fn holds(session: &Session) -> bool {
        session.lifecycle() != Lifecycle::Active || session.turn_index < session.players().len()
    }

    fn description() -> &'static str {
        "Turn index addresses a seated player"
    }
}

/// While active, any armed deadline is tagged to the acting player.
pub struct SingleActingDeadline;

impl Invariant<Session> for SingleActingDeadline {
    fn holds(session: &Session) -> bool {
        if session.lifecycle() != Lifecycle::Active {
            return session.deadline_tag().is_none();
        }
        match (session.deadline_tag(), session.acting_seat()) {
            (Some(tag), Some(seat)) => &tag.player == seat.id() && tag.turn == session.turn_serial,
            (None, _) => true,
            (Some(_), None) => false,
        }
    }

    fn description() -> &'static str {
        "At most one deadline is armed, for the acting player's current turn"
    }
}

/// The stage pointer never leaves the table.
pub struct StageWithinTable;

impl Invariant<Session> for StageWithinTable {
    fn holds(session: &Session) -> bool {
        session.stage_index <= session.stages().last_index()
    }

    fn description() -> &'static str {
        "Stage index is within the stage table"
    }
}

/// Play history and the used-word set hold the same words, each once.
pub struct HistoryMatchesUsedWords;

impl Invariant<Session> for HistoryMatchesUsedWords {
    fn holds(session: &Session) -> bool {
        let distinct: HashSet<&String> = session.history().iter().collect();
        distinct.len() == session.history().len()
            && distinct.len() == session.used_words.len()
            && distinct.iter().all(|w| session.used_words.contains(*w))
    }

    fn description() -> &'static str {
        "Play history matches the used-word set"
    }
}

/// All session invariants as a composable set.
pub type SessionInvariants = (
    TurnIndexInBounds,
    SingleActingDeadline,
    StageWithinTable,
    HistoryMatchesUsedWords,
);

/// Logs and, in debug builds, panics on any violated session invariant.
pub fn assert_invariants(session: &Session) {
    if let Err(violations) = SessionInvariants::check_all(session) {
        for violation in &violations {
            warn!(room = %session.room(), %violation, "Session invariant violated");
        }
        debug_assert!(violations.is_empty(), "session invariants violated: {violations:?}");
    }
}
