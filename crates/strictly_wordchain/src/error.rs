//! Structural errors, rejected at the boundary before the state machine.

use crate::player::PlayerId;
use crate::session::{Lifecycle, RoomId};
use derive_more::{Display, Error};

/// A request that does not fit the room's current state.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum EngineError {
    /// A session already exists in the room.
    #[display("A game is already running in room {}", room)]
    SessionExists {
        /// The room.
        room: RoomId,
    },

    /// No session exists in the room.
    #[display("No game in room {}", room)]
    SessionNotFound {
        /// The room.
        room: RoomId,
    },

    /// The session is not in the lifecycle state the request needs.
    #[display("Game in room {} is {}, expected {}", room, actual, expected)]
    WrongPhase {
        /// The room.
        room: RoomId,
        /// State the request needs.
        expected: Lifecycle,
        /// State the session is in.
        actual: Lifecycle,
    },

    /// The player is already seated.
    #[display("Player {} has already joined", player)]
    AlreadyJoined {
        /// The player.
        player: PlayerId,
    },

    /// The roster has reached its configured capacity.
    #[display("Room {} is full ({} players)", room, capacity)]
    RosterFull {
        /// The room.
        room: RoomId,
        /// Configured maximum.
        capacity: usize,
    },
}
