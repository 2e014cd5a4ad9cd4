//! Turn scheduling: deadlines, expiry arbitration and turn hand-off.
//!
//! Exactly one deadline is armed per active turn. Cancellation is advisory:
//! an expiry that was already dispatched still runs, so the handler re-enters
//! the session lock and checks [`Session::is_current`] before acting.

use crate::engine::Engine;
use crate::event::GameEvent;
use crate::invariants::assert_invariants;
use crate::player::{PlayerId, TurnPrompt, TurnTaker};
use crate::session::{Acceptance, RoomId, Session, SessionId};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// How many recent words a turn announcement carries.
const RECENT_WORDS: usize = 5;

/// Identifies the turn a deadline was armed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeadlineTag {
    /// The player who must answer.
    pub player: PlayerId,
    /// Per-session turn serial.
    pub turn: u64,
}

/// An armed turn timer.
#[derive(Debug)]
pub struct Deadline {
    tag: DeadlineTag,
    handle: JoinHandle<()>,
}

impl Deadline {
    /// Which turn this deadline guards.
    pub fn tag(&self) -> &DeadlineTag {
        &self.tag
    }

    /// Cancels the timer. A no-op if it already fired.
    pub fn disarm(self) {
        debug!(player = %self.tag.player, turn = self.tag.turn, "Deadline disarmed");
        self.handle.abort();
    }
}

impl Engine {
    /// Starts the next turn, or ends the session if one player remains.
    ///
    /// Caller holds the session lock.
    #[instrument(skip_all, fields(room = %session.room(), session_id = %session.id()))]
    pub(crate) async fn begin_turn(&self, session: &mut Session) {
        if session.players().len() <= 1 {
            self.conclude(session).await;
            return;
        }

        if let Some(previous) = session.take_deadline() {
            previous.disarm();
        }
        let (Some(tag), Some(prompt)) = (session.next_tag(), session.turn_prompt()) else {
            return;
        };

        let room = session.room().clone();
        let params = session.round_params();
        session.deadline = Some(self.arm_deadline(room.clone(), session.id(), tag.clone(), prompt.timeout));

        let skip = session.history().len().saturating_sub(RECENT_WORDS);
        self.emit(
            &room,
            GameEvent::TurnAnnounced {
                player: prompt.player.clone(),
                constraint: prompt.constraint,
                min_length: params.min_length,
                timeout_secs: params.timeout_secs,
                stage_number: params.stage_number,
                recent_words: session.history()[skip..].to_vec(),
            },
        );

        if let Some(seat) = session.acting_seat()
            && seat.is_automated()
        {
            self.spawn_automaton(room, session.id(), Arc::clone(seat.taker()), prompt, tag);
        }

        assert_invariants(session);
    }

    /// Arms the turn timer. The returned handle is stored in the session.
    fn arm_deadline(&self, room: RoomId, id: SessionId, tag: DeadlineTag, timeout: Duration) -> Deadline {
        debug!(player = %tag.player, turn = tag.turn, ?timeout, "Deadline armed");
        let engine = self.clone();
        let fired = tag.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            engine.on_deadline_expired(room, id, fired).await;
        });
        Deadline { tag, handle }
    }

    /// Handles a fired deadline. Stale fires are discarded without effect.
    #[instrument(skip(self), fields(player = %tag.player, turn = tag.turn))]
    pub(crate) async fn on_deadline_expired(&self, room: RoomId, id: SessionId, tag: DeadlineTag) {
        let Some(handle) = self.registry().get_exact(&room, id).await else {
            debug!("Deadline fired for a session that is gone");
            return;
        };
        let mut session = handle.lock().await;
        if !session.is_current(&tag) {
            debug!("Stale deadline discarded");
            return;
        }

        // This task is the fired deadline; dropping the handle detaches it.
        drop(session.take_deadline());

        if let Some(elimination) = session.eliminate(&tag.player) {
            info!(player = %elimination.player.id, remaining = elimination.remaining, "Player eliminated");
            self.emit(
                &room,
                GameEvent::PlayerEliminated {
                    player: elimination.player,
                    remaining_count: elimination.remaining,
                },
            );
        }
        session.refresh_pivot(self.dictionary());
        self.begin_turn(&mut session).await;
    }

    /// Announces an accepted word and hands the turn on.
    pub(crate) async fn on_word_accepted(&self, session: &mut Session, acceptance: Acceptance) {
        let room = session.room().clone();
        debug!(player = %acceptance.player.id, word = %acceptance.word, "Word accepted");
        self.emit(
            &room,
            GameEvent::WordAccepted {
                player: acceptance.player,
                word: acceptance.word,
            },
        );
        if let Some(round) = acceptance.stage_advanced {
            info!(stage = round.stage_number, "Stage advanced");
            self.emit(&room, GameEvent::StageAdvanced { round });
        }
        session.refresh_pivot(self.dictionary());
        self.begin_turn(session).await;
    }

    /// Lets an automated seat answer the current turn.
    fn spawn_automaton(
        &self,
        room: RoomId,
        id: SessionId,
        taker: Arc<dyn TurnTaker>,
        prompt: TurnPrompt,
        tag: DeadlineTag,
    ) {
        let engine = self.clone();
        tokio::spawn(async move {
            let Some(word) = taker.choose_word(&prompt, engine.dictionary()).await else {
                debug!(player = %prompt.player.id, "Automaton has no word");
                return;
            };
            engine.submit_for_turn(room, id, tag, word).await;
        });
    }

    /// Submits on behalf of an automated seat if its turn is still open.
    async fn submit_for_turn(&self, room: RoomId, id: SessionId, tag: DeadlineTag, word: String) {
        let Some(handle) = self.registry().get_exact(&room, id).await else {
            return;
        };
        let mut session = handle.lock().await;
        if !session.is_current(&tag) {
            debug!(player = %tag.player, "Automaton answer arrived too late");
            return;
        }
        self.apply_submission(&mut session, &tag.player, &word).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::player::{Player, Seat};
    use crate::session::Lifecycle;
    use crate::testing::{MemoryDictionary, MemoryLedger};
    use tokio::sync::mpsc;

    async fn started() -> (Engine, RoomId, mpsc::UnboundedReceiver<crate::event::RoomEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Engine::new(
            EngineConfig::default(),
            Arc::new(MemoryDictionary::new(["cat", "toy", "yak", "kit"])),
            Arc::new(MemoryLedger::default()),
            tx,
        );
        let room = RoomId::from("room");
        engine
            .request_start(room.clone(), crate::pivot::GameMode::Chain)
            .await
            .expect("start");
        for id in ["alice", "bob"] {
            engine
                .request_join(&room, Seat::human(Player::new(id, id)))
                .await
                .expect("join");
        }
        let handle = engine.registry().get(&room).await.expect("session");
        let id = handle.id();
        engine.close_join_window(room.clone(), id).await;
        (engine, room, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_after_submission_is_discarded() {
        let (engine, room, _rx) = started().await;
        let handle = engine.registry().get(&room).await.expect("session");
        let stale = handle.lock().await.deadline_tag().cloned().expect("armed");

        engine
            .submit_word(&room, &PlayerId::from("alice"), "toy")
            .await
            .expect("submitted");
        engine.on_deadline_expired(room.clone(), handle.id(), stale).await;

        let snapshot = engine.snapshot(&room).await.expect("live");
        assert_eq!(snapshot.players().len(), 2);
        assert_eq!(snapshot.acting_player().map(|p| p.id.as_str()), Some("bob"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_for_same_player_on_later_turn_is_discarded() {
        let (engine, room, _rx) = started().await;
        let handle = engine.registry().get(&room).await.expect("session");
        let stale = handle.lock().await.deadline_tag().cloned().expect("armed");

        let alice = PlayerId::from("alice");
        engine.submit_word(&room, &alice, "toy").await.expect("alice");
        engine
            .submit_word(&room, &PlayerId::from("bob"), "yak")
            .await
            .expect("bob");

        // Alice acts again, under a newer tag.
        let current = handle.lock().await.deadline_tag().cloned().expect("armed");
        assert_eq!(current.player, alice);
        assert_ne!(current, stale);

        engine.on_deadline_expired(room.clone(), handle.id(), stale).await;
        let snapshot = engine.snapshot(&room).await.expect("live");
        assert_eq!(snapshot.lifecycle(), &Lifecycle::Active);
        assert_eq!(snapshot.players().len(), 2);
        assert_eq!(snapshot.deadline().as_ref(), Some(&current));
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_fire_eliminates_and_ends() {
        let (engine, room, _rx) = started().await;
        let handle = engine.registry().get(&room).await.expect("session");
        let tag = handle.lock().await.deadline_tag().cloned().expect("armed");

        engine.on_deadline_expired(room.clone(), handle.id(), tag).await;
        assert!(engine.snapshot(&room).await.is_none());
        assert_eq!(engine.score(&PlayerId::from("bob")).await.ok(), Some(10));
    }
}
