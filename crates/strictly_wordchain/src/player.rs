//! Players and their turn-taking capability.
//!
//! A [`Player`] is plain identity data. A [`Seat`] pairs it with a
//! [`TurnTaker`], which is how automated players take part in the same turn
//! rotation and acceptance pipeline as humans.

use crate::collaborators::Dictionary;
use crate::pivot::Constraint;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Opaque unique player identity, owned by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A participant: identity plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Player's unique ID.
    pub id: PlayerId,
    /// Player's display name.
    pub name: String,
}

impl Player {
    /// Creates a new player.
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Type of player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    /// Words arrive from the transport.
    Human,
    /// Words are chosen by the engine on the player's behalf.
    Automated,
}

/// What an acting player is asked to satisfy this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPrompt {
    /// The player whose turn it is.
    pub player: Player,
    /// Pivot constraint for this turn.
    pub constraint: Constraint,
    /// Minimum accepted word length.
    pub min_length: usize,
    /// Time available to answer.
    pub timeout: Duration,
    /// Words already played this session.
    pub used_words: Arc<HashSet<String>>,
}

impl TurnPrompt {
    /// Whether `word` satisfies every rule the prompt knows about.
    pub fn admits(&self, word: &str) -> bool {
        word.chars().count() >= self.min_length
            && self.constraint.admits(word)
            && !self.used_words.contains(word)
    }
}

/// Capability shared by everyone in the turn rotation.
#[async_trait::async_trait]
pub trait TurnTaker: Send + Sync + fmt::Debug {
    /// Whether the engine should ask this player for words.
    fn kind(&self) -> PlayerKind;

    /// Chooses a word for the prompt, or `None` to stay silent.
    async fn choose_word(&self, prompt: &TurnPrompt, dictionary: &dyn Dictionary)
        -> Option<String>;
}

/// A human whose words are delivered by the transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct Human;

#[async_trait::async_trait]
impl TurnTaker for Human {
    fn kind(&self) -> PlayerKind {
        PlayerKind::Human
    }

    async fn choose_word(&self, _prompt: &TurnPrompt, _dictionary: &dyn Dictionary) -> Option<String> {
        None
    }
}

/// Automated player that answers from the dictionary after a pause.
#[derive(Debug, Clone)]
pub struct Automaton {
    think: Duration,
}

impl Automaton {
    /// Creates an automaton that waits `think` before answering.
    pub fn new(think: Duration) -> Self {
        Self { think }
    }
}

#[async_trait::async_trait]
impl TurnTaker for Automaton {
    fn kind(&self) -> PlayerKind {
        PlayerKind::Automated
    }

    #[instrument(skip_all, fields(player = %prompt.player.id))]
    async fn choose_word(&self, prompt: &TurnPrompt, dictionary: &dyn Dictionary) -> Option<String> {
        tokio::time::sleep(self.think).await;

        let word = dictionary.sample_matching(&|word| prompt.admits(word));
        debug!(?word, constraint = %prompt.constraint, "Automaton chose word");
        word
    }
}

/// A roster entry: who the player is and how they take turns.
#[derive(Debug, Clone)]
pub struct Seat {
    player: Player,
    taker: Arc<dyn TurnTaker>,
}

impl Seat {
    /// Seats a human player.
    pub fn human(player: Player) -> Self {
        Self {
            player,
            taker: Arc::new(Human),
        }
    }

    /// Seats a player with a custom turn-taking capability.
    pub fn with_taker(player: Player, taker: Arc<dyn TurnTaker>) -> Self {
        Self { player, taker }
    }

    /// The seated player.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Shortcut for the seated player's id.
    pub fn id(&self) -> &PlayerId {
        &self.player.id
    }

    /// The player's turn-taking capability.
    pub fn taker(&self) -> &Arc<dyn TurnTaker> {
        &self.taker
    }

    /// Whether the engine plays this seat itself.
    pub fn is_automated(&self) -> bool {
        self.taker.kind() == PlayerKind::Automated
    }
}
