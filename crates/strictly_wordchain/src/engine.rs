//! The engine facade: inbound requests in, [`RoomEvent`]s out.

use crate::collaborators::{Dictionary, LedgerError, ScoreLedger};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::event::{CancelReason, GameEvent, RoomEvent};
use crate::pivot::GameMode;
use crate::player::{PlayerId, Seat};
use crate::registry::{SessionHandle, SessionRegistry};
use crate::rules::Rejection;
use crate::session::{Lifecycle, RoomId, Session, SessionId, SessionSnapshot};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, instrument, warn};

/// Outcome of a word submission that reached an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The word passed every rule.
    Accepted {
        /// The normalised word.
        word: String,
    },
    /// The word was refused; the session is unchanged.
    Rejected(Rejection),
}

/// Runs every word-chain session in the process.
///
/// Cheap to clone; clones share the same registry and collaborators.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Shared>,
}

struct Shared {
    config: EngineConfig,
    registry: SessionRegistry,
    dictionary: Arc<dyn Dictionary>,
    ledger: Arc<dyn ScoreLedger>,
    events: UnboundedSender<RoomEvent>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.inner.config)
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine that reports to `events`.
    #[instrument(skip_all)]
    pub fn new(
        config: EngineConfig,
        dictionary: Arc<dyn Dictionary>,
        ledger: Arc<dyn ScoreLedger>,
        events: UnboundedSender<RoomEvent>,
    ) -> Self {
        info!(
            join_window = ?config.join_window(),
            required_players = config.required_players(),
            stages = config.stages().stages().len(),
            "Creating engine"
        );
        Self {
            inner: Arc::new(Shared {
                config,
                registry: SessionRegistry::new(),
                dictionary,
                ledger,
                events,
            }),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub(crate) fn registry(&self) -> &SessionRegistry {
        &self.inner.registry
    }

    pub(crate) fn dictionary(&self) -> &dyn Dictionary {
        self.inner.dictionary.as_ref()
    }

    pub(crate) fn emit(&self, room: &RoomId, event: GameEvent) {
        let event = RoomEvent {
            room: room.clone(),
            event,
        };
        if self.inner.events.send(event).is_err() {
            warn!(%room, "Event receiver dropped");
        }
    }

    /// Opens a session in `room` and starts its join window.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionExists`] if the room already has a session.
    #[instrument(skip(self))]
    pub async fn request_start(&self, room: RoomId, mode: GameMode) -> Result<SessionId, EngineError> {
        let config = self.config();
        let handle = self
            .registry()
            .create(room.clone(), mode, config.stages().clone())
            .await?;
        let id = handle.id();
        let window = *config.join_window();

        info!(session_id = %id, ?window, "Session opened");
        self.emit(
            &room,
            GameEvent::SessionOpened {
                mode,
                join_window_secs: window.as_secs(),
            },
        );

        let engine = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            engine.close_join_window(room, id).await;
        });
        Ok(id)
    }

    /// Seats a player in a forming session.
    ///
    /// # Errors
    ///
    /// [`EngineError::SessionNotFound`] without a session, otherwise whatever
    /// [`Session::join`] refuses.
    #[instrument(skip(self, seat), fields(player = %seat.id()))]
    pub async fn request_join(&self, room: &RoomId, seat: Seat) -> Result<usize, EngineError> {
        let handle = self.lookup(room).await?;
        let mut session = handle.lock().await;
        let player = seat.player().clone();
        let player_count = session.join(seat, *self.config().max_players())?;

        info!(player_count, "Player joined");
        self.emit(room, GameEvent::PlayerJoined { player, player_count });
        Ok(player_count)
    }

    /// Runs a submission through the acceptance pipeline.
    ///
    /// Pipeline rejections are a [`Verdict`], not an error, and are also
    /// emitted as [`GameEvent::WordRejected`].
    ///
    /// # Errors
    ///
    /// [`EngineError::SessionNotFound`] or [`EngineError::WrongPhase`] when
    /// there is no active session in the room.
    #[instrument(skip(self))]
    pub async fn submit_word(
        &self,
        room: &RoomId,
        player: &PlayerId,
        raw: &str,
    ) -> Result<Verdict, EngineError> {
        let handle = self.lookup(room).await?;
        let mut session = handle.lock().await;
        if session.lifecycle() != Lifecycle::Active {
            return Err(EngineError::WrongPhase {
                room: room.clone(),
                expected: Lifecycle::Active,
                actual: session.lifecycle(),
            });
        }
        Ok(self.apply_submission(&mut session, player, raw).await)
    }

    /// Validates and applies a submission. Caller holds the session lock.
    pub(crate) async fn apply_submission(
        &self,
        session: &mut Session,
        player: &PlayerId,
        raw: &str,
    ) -> Verdict {
        match session.accept(player, raw, self.dictionary()) {
            Ok(acceptance) => {
                let word = acceptance.word.clone();
                self.on_word_accepted(session, acceptance).await;
                Verdict::Accepted { word }
            }
            Err(reason) => {
                debug!(%reason, "Word rejected");
                self.emit(
                    session.room(),
                    GameEvent::WordRejected {
                        player: player.clone(),
                        reason,
                    },
                );
                Verdict::Rejected(reason)
            }
        }
    }

    /// Stops the session in `room` without crediting anyone.
    ///
    /// Authorisation of `actor` is the caller's concern.
    ///
    /// # Errors
    ///
    /// [`EngineError::SessionNotFound`] if the room has no session.
    #[instrument(skip(self))]
    pub async fn force_end(&self, room: &RoomId, actor: &PlayerId) -> Result<(), EngineError> {
        let handle = self.lookup(room).await?;
        let mut session = handle.lock().await;
        if session.lifecycle() == Lifecycle::Ended {
            return Err(EngineError::SessionNotFound { room: room.clone() });
        }
        session.end();

        info!(session_id = %session.id(), "Session force-ended");
        self.emit(
            room,
            GameEvent::SessionCancelled {
                reason: CancelReason::ForceEnded {
                    actor: actor.clone(),
                },
            },
        );
        self.registry().remove(room, session.id()).await;
        Ok(())
    }

    /// Point-in-time view of the session in `room`.
    pub async fn snapshot(&self, room: &RoomId) -> Option<SessionSnapshot> {
        let handle = self.registry().get(room).await?;
        let session = handle.lock().await;
        Some(session.snapshot())
    }

    /// Rooms with a live session.
    pub async fn rooms(&self) -> Vec<RoomId> {
        self.registry().rooms().await
    }

    /// Reads a player's persistent score.
    ///
    /// # Errors
    ///
    /// Propagates the ledger's failure.
    pub async fn score(&self, player: &PlayerId) -> Result<i64, LedgerError> {
        self.inner.ledger.read(player)
    }

    async fn lookup(&self, room: &RoomId) -> Result<SessionHandle, EngineError> {
        self.registry()
            .get(room)
            .await
            .ok_or_else(|| EngineError::SessionNotFound { room: room.clone() })
    }

    /// Decides a forming session once its join window has elapsed.
    ///
    /// Does nothing if the room now holds a different session, or the session
    /// already left `Forming`.
    #[instrument(skip(self))]
    pub(crate) async fn close_join_window(&self, room: RoomId, id: SessionId) {
        let Some(handle) = self.registry().get_exact(&room, id).await else {
            debug!("Join window closed for a session that is gone");
            return;
        };
        let mut session = handle.lock().await;
        if session.lifecycle() != Lifecycle::Forming {
            return;
        }

        let joined = session.players().len();
        let required = self.config().required_players();
        if joined < required {
            self.cancel(&mut session, CancelReason::NotEnoughPlayers { joined, required })
                .await;
            return;
        }

        let Some(opening) = session.mode().open(self.dictionary(), session.stages()) else {
            error!(mode = %session.mode(), "Dictionary cannot seed the game");
            self.cancel(&mut session, CancelReason::NoStartingWord).await;
            return;
        };

        let starting_word = opening.starting_word.clone();
        let constraint = opening.pivot.constraint();
        session.activate(opening);

        info!(players = joined, ?starting_word, "Session started");
        self.emit(
            &room,
            GameEvent::SessionStarted {
                players: session.players().iter().map(|s| s.player().clone()).collect(),
                starting_word,
                constraint,
                round: session.round_params(),
            },
        );
        self.begin_turn(&mut session).await;
    }

    async fn cancel(&self, session: &mut Session, reason: CancelReason) {
        info!(room = %session.room(), %reason, "Session cancelled");
        session.end();
        self.emit(session.room(), GameEvent::SessionCancelled { reason });
        self.registry().remove(session.room(), session.id()).await;
    }

    /// Ends the session with its sole remaining player as winner.
    ///
    /// The terminal event goes out before the room is freed, so a new session
    /// in the same room always reports after it.
    pub(crate) async fn conclude(&self, session: &mut Session) {
        let Some(winner) = session.players().first().map(|s| s.player().clone()) else {
            let required = self.config().required_players();
            self.cancel(session, CancelReason::NotEnoughPlayers { joined: 0, required })
                .await;
            return;
        };

        session.end();

        let reward = *self.config().win_reward();
        let total = match self.inner.ledger.credit(&winner.id, reward) {
            Ok(total) => Some(total),
            Err(e) => {
                warn!(error = %e, player = %winner.id, "Failed to credit winner");
                None
            }
        };

        info!(winner = %winner.id, reward, ?total, "Session ended");
        self.emit(
            session.room(),
            GameEvent::SessionEnded {
                winner,
                reward,
                total,
            },
        );
        self.registry().remove(session.room(), session.id()).await;
    }
}
