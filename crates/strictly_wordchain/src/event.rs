//! Outbound events for the transport to render and deliver.

use crate::pivot::{Constraint, GameMode};
use crate::player::{Player, PlayerId};
use crate::rules::Rejection;
use crate::session::RoomId;
use crate::stage::RoundParams;
use serde::Serialize;

/// An event together with the room it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomEvent {
    /// Where the event happened.
    pub room: RoomId,
    /// What happened.
    pub event: GameEvent,
}

/// Something players in a room should be told about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A session was created and is accepting joins.
    SessionOpened {
        /// Pivot policy for the session.
        mode: GameMode,
        /// How long joins are accepted.
        join_window_secs: u64,
    },
    /// A player took a seat.
    PlayerJoined {
        /// Who joined.
        player: Player,
        /// Roster size after the join.
        player_count: usize,
    },
    /// The join window closed with enough players; play begins.
    SessionStarted {
        /// Roster in turn order.
        players: Vec<Player>,
        /// Starting word, in chain mode.
        starting_word: Option<String>,
        /// First-turn constraint.
        constraint: Constraint,
        /// Parameters of the first stage.
        round: RoundParams,
    },
    /// A player must answer now.
    TurnAnnounced {
        /// The acting player.
        player: Player,
        /// What the word must satisfy.
        constraint: Constraint,
        /// Minimum word length.
        min_length: usize,
        /// Seconds to answer.
        timeout_secs: u64,
        /// 1-based stage number.
        stage_number: usize,
        /// Most recently played words, oldest first.
        recent_words: Vec<String>,
    },
    /// A submission passed every rule.
    WordAccepted {
        /// Who played it.
        player: Player,
        /// The normalised word.
        word: String,
    },
    /// A submission was refused.
    WordRejected {
        /// Who submitted it.
        player: PlayerId,
        /// Why it was refused.
        reason: Rejection,
    },
    /// A player ran out of time and left the rotation.
    PlayerEliminated {
        /// Who was eliminated.
        player: Player,
        /// Players still in the game.
        remaining_count: usize,
    },
    /// The session moved to a harder stage.
    StageAdvanced {
        /// Parameters of the new stage.
        round: RoundParams,
    },
    /// One player remains and has been credited.
    SessionEnded {
        /// The last player standing.
        winner: Player,
        /// Points credited.
        reward: i64,
        /// Winner's new total, if the ledger write succeeded.
        total: Option<i64>,
    },
    /// The session ended without a winner.
    SessionCancelled {
        /// Why it was cancelled.
        reason: CancelReason,
    },
}

/// Why a session ended without a winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CancelReason {
    /// The join window closed with too few players.
    #[display("only {} of {} required players joined", joined, required)]
    NotEnoughPlayers {
        /// Players who joined.
        joined: usize,
        /// Players required.
        required: usize,
    },
    /// The dictionary could not seed the game.
    #[display("no starting word could be found")]
    NoStartingWord,
    /// An authorised actor stopped the game.
    #[display("ended by {}", actor)]
    ForceEnded {
        /// Who ended it.
        actor: PlayerId,
    },
}
