//! Tests for session creation, joining, cancellation and force end.

mod common;

use std::time::Duration;

use common::{Harness, JOIN_WINDOW, config, settle};
use strictly_wordchain::{
    CancelReason, EngineError, GameEvent, GameMode, Lifecycle, Player, PlayerId, RoomId, Seat,
};

const WORDS: &[&str] = &["cat", "toy", "yak", "kit", "tea"];

#[tokio::test(start_paused = true)]
async fn test_join_window_starts_game() {
    let mut h = Harness::new(WORDS);
    h.engine
        .request_start(h.room.clone(), GameMode::Chain)
        .await
        .expect("start");
    assert_eq!(h.join("alice").await, 1);
    assert_eq!(h.join("bob").await, 2);
    assert_eq!(h.snapshot().await.lifecycle(), &Lifecycle::Forming);

    settle(JOIN_WINDOW).await;

    let snapshot = h.snapshot().await;
    assert_eq!(snapshot.lifecycle(), &Lifecycle::Active);
    assert_eq!(snapshot.used_words(), &vec!["cat".to_string()]);

    let events = h.drain();
    assert_eq!(
        events[0],
        GameEvent::SessionOpened {
            mode: GameMode::Chain,
            join_window_secs: 10,
        }
    );
    assert!(matches!(&events[1], GameEvent::PlayerJoined { player_count: 1, .. }));
    assert!(matches!(&events[2], GameEvent::PlayerJoined { player_count: 2, .. }));
    match &events[3] {
        GameEvent::SessionStarted {
            players,
            starting_word,
            round,
            ..
        } => {
            assert_eq!(players.len(), 2);
            assert_eq!(starting_word.as_deref(), Some("cat"));
            assert_eq!(round.stage_number, 1);
        }
        other => panic!("expected SessionStarted, got {other:?}"),
    }
    assert!(matches!(&events[4], GameEvent::TurnAnnounced { timeout_secs: 35, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_too_few_players_cancels() {
    let mut h = Harness::new(WORDS);
    h.engine
        .request_start(h.room.clone(), GameMode::Chain)
        .await
        .expect("start");
    h.join("alice").await;
    settle(JOIN_WINDOW).await;

    assert!(h.engine.rooms().await.is_empty());
    let events = h.drain();
    assert_eq!(
        events.last(),
        Some(&GameEvent::SessionCancelled {
            reason: CancelReason::NotEnoughPlayers {
                joined: 1,
                required: 2
            }
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_missing_starting_word_cancels() {
    let mut h = Harness::new(&["ox", "to"]);
    h.start(GameMode::Chain, &["alice", "bob"]).await;

    assert!(h.engine.snapshot(&h.room).await.is_none());
    let events = h.drain();
    assert_eq!(
        events.last(),
        Some(&GameEvent::SessionCancelled {
            reason: CancelReason::NoStartingWord
        })
    );
    assert!(!events.iter().any(|e| matches!(e, GameEvent::SessionStarted { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_structural_errors() {
    let h = Harness::with_config(WORDS, config().with_max_players(2));
    let room = h.room.clone();
    let alice = PlayerId::from("alice");

    assert_eq!(
        h.engine.submit_word(&room, &alice, "toy").await,
        Err(EngineError::SessionNotFound { room: room.clone() })
    );
    assert_eq!(
        h.engine
            .request_join(&room, Seat::human(Player::new("alice", "Alice")))
            .await,
        Err(EngineError::SessionNotFound { room: room.clone() })
    );

    h.engine
        .request_start(room.clone(), GameMode::Chain)
        .await
        .expect("start");
    assert_eq!(
        h.engine.request_start(room.clone(), GameMode::Chain).await,
        Err(EngineError::SessionExists { room: room.clone() })
    );

    h.join("alice").await;
    assert_eq!(
        h.engine
            .request_join(&room, Seat::human(Player::new("alice", "Alice")))
            .await,
        Err(EngineError::AlreadyJoined {
            player: alice.clone()
        })
    );
    h.join("bob").await;
    assert_eq!(
        h.engine
            .request_join(&room, Seat::human(Player::new("carol", "Carol")))
            .await,
        Err(EngineError::RosterFull {
            room: room.clone(),
            capacity: 2
        })
    );
    assert_eq!(
        h.engine.submit_word(&room, &alice, "toy").await,
        Err(EngineError::WrongPhase {
            room: room.clone(),
            expected: Lifecycle::Active,
            actual: Lifecycle::Forming,
        })
    );

    settle(JOIN_WINDOW).await;
    assert!(matches!(
        h.engine
            .request_join(&room, Seat::human(Player::new("dave", "Dave")))
            .await,
        Err(EngineError::WrongPhase {
            expected: Lifecycle::Forming,
            actual: Lifecycle::Active,
            ..
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_force_end_credits_nobody() {
    let mut h = Harness::new(WORDS);
    h.start(GameMode::Chain, &["alice", "bob"]).await;
    h.drain();

    let admin = PlayerId::from("admin");
    h.engine.force_end(&h.room, &admin).await.expect("live");
    assert_eq!(
        h.drain(),
        vec![GameEvent::SessionCancelled {
            reason: CancelReason::ForceEnded { actor: admin.clone() }
        }]
    );

    // The disarmed deadline never eliminates anyone.
    settle(Duration::from_secs(60)).await;
    assert!(h.drain().is_empty());
    assert_eq!(h.engine.score(&PlayerId::from("alice")).await.ok(), Some(0));
    assert_eq!(h.engine.score(&PlayerId::from("bob")).await.ok(), Some(0));
    assert_eq!(
        h.engine.force_end(&h.room, &admin).await,
        Err(EngineError::SessionNotFound {
            room: h.room.clone()
        })
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_restart_reports_after_force_end() {
    for _ in 0..20 {
        let mut h = Harness::new(WORDS);
        h.engine
            .request_start(h.room.clone(), GameMode::Chain)
            .await
            .expect("first start");

        // Keep trying to reopen the room while it is being ended.
        let engine = h.engine.clone();
        let room = h.room.clone();
        let restart = tokio::spawn(async move {
            while engine.request_start(room.clone(), GameMode::Chain).await.is_err() {
                tokio::task::yield_now().await;
            }
        });
        h.engine
            .force_end(&h.room, &PlayerId::from("admin"))
            .await
            .expect("live");
        restart.await.expect("restart task");

        let events = h.drain();
        assert_eq!(events.len(), 3, "{events:?}");
        assert!(matches!(events[0], GameEvent::SessionOpened { .. }));
        assert!(matches!(events[1], GameEvent::SessionCancelled { .. }));
        assert!(matches!(events[2], GameEvent::SessionOpened { .. }));
    }
}

#[tokio::test(start_paused = true)]
async fn test_restarted_room_ignores_old_join_window() {
    let mut h = Harness::new(WORDS);
    let room = h.room.clone();
    h.engine
        .request_start(room.clone(), GameMode::Chain)
        .await
        .expect("first start");
    settle(Duration::from_secs(5)).await;
    h.engine
        .force_end(&room, &PlayerId::from("admin"))
        .await
        .expect("live");

    h.engine
        .request_start(room.clone(), GameMode::Chain)
        .await
        .expect("second start");
    h.join("alice").await;
    h.join("bob").await;
    h.drain();

    // The first session's window elapses here and must not touch the second.
    settle(Duration::from_secs(5)).await;
    assert_eq!(h.snapshot().await.lifecycle(), &Lifecycle::Forming);
    assert!(h.drain().is_empty());

    settle(Duration::from_secs(5)).await;
    assert_eq!(h.snapshot().await.lifecycle(), &Lifecycle::Active);
}

#[tokio::test(start_paused = true)]
async fn test_rooms_are_independent() {
    let h = Harness::new(WORDS);
    let other = RoomId::from("other");
    h.engine
        .request_start(other.clone(), GameMode::FixedFirstLetter)
        .await
        .expect("other room");
    h.engine
        .request_start(h.room.clone(), GameMode::Chain)
        .await
        .expect("room");
    h.join("alice").await;
    h.join("bob").await;
    assert_eq!(h.engine.rooms().await, vec![other.clone(), h.room.clone()]);

    settle(JOIN_WINDOW).await;

    // The empty room is cancelled; the full one plays on.
    assert!(h.engine.snapshot(&other).await.is_none());
    assert_eq!(h.engine.rooms().await, vec![h.room.clone()]);
    assert_eq!(h.snapshot().await.lifecycle(), &Lifecycle::Active);
}
