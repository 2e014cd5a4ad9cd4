//! The session aggregate and its lifecycle state machine.
//!
//! `Forming -> Active -> Ended`, with `Forming -> Ended` for cancellation.
//! Every method here is synchronous and assumes the caller holds the
//! session's lock; timers and events are the engine's business.

use crate::collaborators::Dictionary;
use crate::error::EngineError;
use crate::pivot::{Constraint, GameMode, Opening, Pivot};
use crate::player::{Player, PlayerId, Seat, TurnPrompt};
use crate::rules::{normalize, ActingPlayer, LegalWord, Rejection, WordContext};
use crate::scheduler::{Deadline, DeadlineTag};
use crate::stage::{RoundParams, StageTable};
use derive_getters::Getters;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Where a game runs (a chat, a channel, a table).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Registry generation of a session, unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
pub struct SessionId(pub(crate) u64);

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Lifecycle {
    /// Accepting joins, no play yet.
    Forming,
    /// Turns in progress.
    Active,
    /// Terminal; the session has left the registry.
    Ended,
}

/// Result of an accepted word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acceptance {
    /// Who played the word.
    pub player: Player,
    /// The normalised word.
    pub word: String,
    /// New stage parameters, if this word completed the stage quota.
    pub stage_advanced: Option<RoundParams>,
}

/// Result of removing a player from the rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elimination {
    /// Who was removed.
    pub player: Player,
    /// Players left.
    pub remaining: usize,
}

/// One game in one room.
#[derive(Debug)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) room: RoomId,
    pub(crate) mode: GameMode,
    pub(crate) stages: StageTable,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) players: Vec<Seat>,
    /// Shared with outstanding turn prompts; copied only when written while shared.
    pub(crate) used_words: Arc<HashSet<String>>,
    /// Played words in order; the same set as `used_words`.
    pub(crate) history: Vec<String>,
    pub(crate) stage_index: usize,
    pub(crate) words_in_stage: u32,
    pub(crate) turn_index: usize,
    pub(crate) pivot: Option<Pivot>,
    pub(crate) deadline: Option<Deadline>,
    /// Incremented on every turn; distinguishes deadlines for the same player.
    pub(crate) turn_serial: u64,
}

impl Session {
    /// Creates a forming session.
    #[instrument(skip(stages))]
    pub fn new(id: SessionId, room: RoomId, mode: GameMode, stages: StageTable) -> Self {
        debug!("Creating session");
        Self {
            id,
            room,
            mode,
            stages,
            lifecycle: Lifecycle::Forming,
            players: Vec::new(),
            used_words: Arc::default(),
            history: Vec::new(),
            stage_index: 0,
            words_in_stage: 0,
            turn_index: 0,
            pivot: None,
            deadline: None,
            turn_serial: 0,
        }
    }

    /// Registry generation.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Room the session runs in.
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// Pivot policy.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Stage table in use.
    pub fn stages(&self) -> &StageTable {
        &self.stages
    }

    /// Roster in turn order.
    pub fn players(&self) -> &[Seat] {
        &self.players
    }

    /// Words played so far, in order.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Parameters for the current stage.
    pub fn round_params(&self) -> RoundParams {
        self.stages.round_params(self.stage_index)
    }

    /// The seat whose turn it is. `None` unless active.
    pub fn acting_seat(&self) -> Option<&Seat> {
        match self.lifecycle {
            Lifecycle::Active => self.players.get(self.turn_index),
            _ => None,
        }
    }

    /// Tag of the armed deadline, if any.
    pub fn deadline_tag(&self) -> Option<&DeadlineTag> {
        self.deadline.as_ref().map(Deadline::tag)
    }

    /// Seats a player while the session is forming.
    ///
    /// Returns the roster size after the join.
    #[instrument(skip(self, seat), fields(room = %self.room, player = %seat.id()))]
    pub fn join(&mut self, seat: Seat, max_players: Option<usize>) -> Result<usize, EngineError> {
        if self.lifecycle != Lifecycle::Forming {
            warn!(lifecycle = %self.lifecycle, "Join outside the join window");
            return Err(EngineError::WrongPhase {
                room: self.room.clone(),
                expected: Lifecycle::Forming,
                actual: self.lifecycle,
            });
        }
        if self.players.iter().any(|s| s.id() == seat.id()) {
            return Err(EngineError::AlreadyJoined {
                player: seat.id().clone(),
            });
        }
        if let Some(capacity) = max_players
            && self.players.len() >= capacity
        {
            return Err(EngineError::RosterFull {
                room: self.room.clone(),
                capacity,
            });
        }

        self.players.push(seat);
        Ok(self.players.len())
    }

    /// Enters play with the given opening. The first seat acts first.
    #[instrument(skip(self, opening), fields(room = %self.room))]
    pub fn activate(&mut self, opening: Opening) {
        if let Some(word) = opening.starting_word {
            self.record(word);
        }
        self.pivot = Some(opening.pivot);
        self.turn_index = 0;
        self.lifecycle = Lifecycle::Active;
    }

    /// Runs a submission through the acceptance pipeline and applies it.
    ///
    /// On success the word is recorded, the pivot and turn advance, and the
    /// stage quota is evaluated. A rejection leaves the session untouched.
    #[instrument(skip(self, dictionary), fields(room = %self.room))]
    pub fn accept(
        &mut self,
        submitter: &PlayerId,
        raw: &str,
        dictionary: &dyn Dictionary,
    ) -> Result<Acceptance, Rejection> {
        ActingPlayer::check(submitter, self.acting_seat().map(Seat::id))?;
        let Some(pivot) = self.pivot.as_ref() else {
            return Err(Rejection::NotYourTurn);
        };

        let word = normalize(raw);
        let ctx = WordContext {
            min_length: self.round_params().min_length,
            dictionary,
            used_words: &self.used_words,
            pivot,
        };
        LegalWord::check(&word, &ctx)?;

        let player = self.players[self.turn_index].player().clone();
        self.record(word.clone());
        if let Some(pivot) = self.pivot.as_mut() {
            pivot.advance(&word);
        }
        self.words_in_stage += 1;
        self.turn_index = (self.turn_index + 1) % self.players.len();
        let stage_advanced = self.advance_stage();

        Ok(Acceptance {
            player,
            word,
            stage_advanced,
        })
    }

    /// Moves to the next stage once the current quota is met.
    fn advance_stage(&mut self) -> Option<RoundParams> {
        let quota = self.stages.get(self.stage_index).quota()?;
        if self.words_in_stage < quota || self.stage_index >= self.stages.last_index() {
            return None;
        }
        self.stage_index = self.stages.clamp(self.stage_index + 1);
        self.words_in_stage = 0;
        Some(self.round_params())
    }

    fn record(&mut self, word: String) {
        if Arc::make_mut(&mut self.used_words).insert(word.clone()) {
            self.history.push(word);
        }
    }

    /// Removes a player, keeping the rest in order and the turn pointing at
    /// the player who should act next.
    #[instrument(skip(self), fields(room = %self.room))]
    pub fn eliminate(&mut self, player: &PlayerId) -> Option<Elimination> {
        let position = self.players.iter().position(|s| s.id() == player)?;
        let seat = self.players.remove(position);

        if position < self.turn_index {
            self.turn_index -= 1;
        }
        self.turn_index = match self.players.len() {
            0 => 0,
            len => self.turn_index % len,
        };

        Some(Elimination {
            player: seat.player().clone(),
            remaining: self.players.len(),
        })
    }

    /// Redraws per-turn pivot state for the current stage.
    pub fn refresh_pivot(&mut self, dictionary: &dyn Dictionary) {
        let min_length = self.round_params().min_length;
        if let Some(pivot) = self.pivot.as_mut() {
            pivot.refresh(dictionary, min_length);
        }
    }

    /// Opens a new turn for the acting player and returns its deadline tag.
    pub fn next_tag(&mut self) -> Option<DeadlineTag> {
        let player = self.acting_seat()?.id().clone();
        self.turn_serial += 1;
        Some(DeadlineTag {
            player,
            turn: self.turn_serial,
        })
    }

    /// What the acting player must satisfy.
    pub fn turn_prompt(&self) -> Option<TurnPrompt> {
        let seat = self.acting_seat()?;
        let params = self.round_params();
        Some(TurnPrompt {
            player: seat.player().clone(),
            constraint: self.pivot.as_ref()?.constraint(),
            min_length: params.min_length,
            timeout: params.timeout(),
            used_words: Arc::clone(&self.used_words),
        })
    }

    /// Removes the armed deadline without disarming it.
    pub(crate) fn take_deadline(&mut self) -> Option<Deadline> {
        self.deadline.take()
    }

    /// Whether `tag` still guards the current turn.
    pub fn is_current(&self, tag: &DeadlineTag) -> bool {
        self.lifecycle == Lifecycle::Active
            && self.deadline_tag() == Some(tag)
            && self.acting_seat().map(Seat::id) == Some(&tag.player)
    }

    /// Enters the terminal state and disarms any deadline.
    pub fn end(&mut self) {
        if let Some(deadline) = self.deadline.take() {
            deadline.disarm();
        }
        self.lifecycle = Lifecycle::Ended;
    }

    /// Point-in-time copy for inspection.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            room: self.room.clone(),
            mode: self.mode,
            lifecycle: self.lifecycle,
            players: self.players.iter().map(|s| s.player().clone()).collect(),
            used_words: self.history.clone(),
            stage_index: self.stage_index,
            words_in_stage: self.words_in_stage,
            turn_index: self.turn_index,
            constraint: self.pivot.as_ref().map(Pivot::constraint),
            deadline: self.deadline_tag().cloned(),
        }
    }
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct SessionSnapshot {
    id: SessionId,
    room: RoomId,
    mode: GameMode,
    lifecycle: Lifecycle,
    players: Vec<Player>,
    used_words: Vec<String>,
    stage_index: usize,
    words_in_stage: u32,
    turn_index: usize,
    constraint: Option<Constraint>,
    deadline: Option<DeadlineTag>,
}

impl SessionSnapshot {
    /// The acting player, if the session is active.
    pub fn acting_player(&self) -> Option<&Player> {
        match self.lifecycle {
            Lifecycle::Active => self.players.get(self.turn_index),
            _ => None,
        }
    }
}
