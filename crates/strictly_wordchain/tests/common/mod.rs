//! Shared fixtures for engine integration tests.
//!
//! Tests run on a paused tokio clock: `settle` sleeps the test task, letting
//! the runtime auto-advance through join windows and deadlines in order.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use strictly_wordchain::{
    Dictionary, Engine, EngineConfig, GameEvent, GameMode, LedgerError, Player, PlayerId,
    RoomEvent, RoomId, ScoreLedger, Seat, SessionSnapshot,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Join window used by every harness.
pub const JOIN_WINDOW: Duration = Duration::from_secs(10);

/// Word list that samples deterministically: the first match in insertion order.
pub struct MemoryDictionary(Vec<String>);

impl MemoryDictionary {
    pub fn new(words: &[&str]) -> Self {
        Self(words.iter().map(|w| w.to_string()).collect())
    }
}

impl Dictionary for MemoryDictionary {
    fn contains(&self, word: &str) -> bool {
        self.0.iter().any(|w| w == word)
    }

    fn sample_matching(&self, accept: &dyn Fn(&str) -> bool) -> Option<String> {
        self.0.iter().find(|w| accept(w.as_str())).cloned()
    }
}

/// Score ledger kept in memory; can be told to fail.
#[derive(Default)]
pub struct MemoryLedger {
    scores: Mutex<HashMap<PlayerId, i64>>,
    failing: bool,
}

impl MemoryLedger {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }
}

impl ScoreLedger for MemoryLedger {
    fn credit(&self, player: &PlayerId, amount: i64) -> Result<i64, LedgerError> {
        if self.failing {
            return Err(LedgerError::new("ledger offline"));
        }
        let mut scores = self.scores.lock().expect("ledger lock");
        let total = scores.entry(player.clone()).or_insert(0);
        *total += amount;
        Ok(*total)
    }

    fn read(&self, player: &PlayerId) -> Result<i64, LedgerError> {
        if self.failing {
            return Err(LedgerError::new("ledger offline"));
        }
        Ok(self
            .scores
            .lock()
            .expect("ledger lock")
            .get(player)
            .copied()
            .unwrap_or(0))
    }
}

/// Routes engine logs through the test harness; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An engine, its event stream and one room to play in.
pub struct Harness {
    pub engine: Engine,
    pub events: UnboundedReceiver<RoomEvent>,
    pub room: RoomId,
}

impl Harness {
    pub fn new(words: &[&str]) -> Self {
        Self::with_config(words, config())
    }

    pub fn with_config(words: &[&str], config: EngineConfig) -> Self {
        Self::with_ledger(words, config, MemoryLedger::default())
    }

    pub fn with_ledger(words: &[&str], config: EngineConfig, ledger: MemoryLedger) -> Self {
        init_tracing();
        let (tx, events) = mpsc::unbounded_channel();
        let engine = Engine::new(
            config,
            Arc::new(MemoryDictionary::new(words)),
            Arc::new(ledger),
            tx,
        );
        Self {
            engine,
            events,
            room: RoomId::from("room"),
        }
    }

    /// Opens the room, seats `players` as humans and waits out the join window.
    pub async fn start(&mut self, mode: GameMode, players: &[&str]) {
        self.engine
            .request_start(self.room.clone(), mode)
            .await
            .expect("start");
        for id in players {
            self.join(id).await;
        }
        settle(JOIN_WINDOW).await;
    }

    pub async fn join(&self, id: &str) -> usize {
        self.engine
            .request_join(&self.room, Seat::human(Player::new(id, id.to_uppercase())))
            .await
            .expect("join")
    }

    /// Submits a word and returns the verdict.
    pub async fn say(&self, player: &str, word: &str) -> strictly_wordchain::Verdict {
        self.engine
            .submit_word(&self.room, &PlayerId::from(player), word)
            .await
            .expect("active session")
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.engine.snapshot(&self.room).await.expect("live session")
    }

    /// Every event emitted so far, in order.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event.event);
        }
        drained
    }
}

/// Config used by the harness: classic stages and a short join window.
pub fn config() -> EngineConfig {
    EngineConfig::default().with_join_window(JOIN_WINDOW)
}

/// Lets paused time run just past `duration`.
pub async fn settle(duration: Duration) {
    tokio::time::sleep(duration + Duration::from_millis(1)).await;
}

/// Id of the acting player, if any.
pub fn acting(snapshot: &SessionSnapshot) -> Option<&str> {
    snapshot.acting_player().map(|p| p.id.as_str())
}

/// Players named in `TurnAnnounced` events, in order.
pub fn announced(events: &[GameEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::TurnAnnounced { player, .. } => Some(player.id.to_string()),
            _ => None,
        })
        .collect()
}
