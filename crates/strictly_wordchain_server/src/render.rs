//! Plain-text rendering of engine events.

use strictly_wordchain::{GameEvent, RoomEvent};

/// Renders one event as the lines players in the room would see.
pub fn render(event: &RoomEvent) -> String {
    let body = match &event.event {
        GameEvent::SessionOpened {
            mode,
            join_window_secs,
        } => format!(
            "A new {} game is starting! Join within {}s.",
            mode, join_window_secs
        ),
        GameEvent::PlayerJoined {
            player,
            player_count,
        } => format!("{} joined the game. Players: {}", player, player_count),
        GameEvent::SessionStarted {
            players,
            starting_word,
            constraint,
            round,
        } => {
            let names: Vec<String> = players.iter().map(ToString::to_string).collect();
            let mut text = format!("WORD CHAIN BATTLE COMMENCES with {}!", names.join(", "));
            if let Some(word) = starting_word {
                text.push_str(&format!("\nStarting word: {}", word.to_uppercase()));
            }
            text.push_str(&format!(
                "\nRound {} rules: min length {}, timeout {}s, next word {}",
                round.stage_number,
                round.min_length,
                round.timeout_secs,
                constraint
            ));
            text
        }
        GameEvent::TurnAnnounced {
            player,
            constraint,
            min_length,
            timeout_secs,
            stage_number,
            recent_words,
        } => {
            let mut text = format!(
                "{}'s turn! Stage {}: {} letters or more, {}s, word {}",
                player,
                stage_number,
                min_length,
                timeout_secs,
                constraint
            );
            if !recent_words.is_empty() {
                text.push_str(&format!("\nRecent words: {}", recent_words.join(", ")));
            }
            text
        }
        GameEvent::WordAccepted { player, word } => {
            format!("{} played {}", player, word.to_uppercase())
        }
        GameEvent::WordRejected { player, reason } => format!("{}: {}", player, reason),
        GameEvent::PlayerEliminated {
            player,
            remaining_count,
        } => format!(
            "TIME'S UP! {} has been eliminated. Remaining players: {}",
            player, remaining_count
        ),
        GameEvent::StageAdvanced { round } => format!(
            "ADVANCING TO STAGE {}: min length {}, timeout {}s",
            round.stage_number, round.min_length, round.timeout_secs
        ),
        GameEvent::SessionEnded {
            winner,
            reward,
            total,
        } => {
            let mut text = format!("VICTORY! {} wins +{} points", winner, reward);
            if let Some(total) = total {
                text.push_str(&format!(" (total {})", total));
            }
            text
        }
        GameEvent::SessionCancelled { reason } => format!("Game cancelled: {}", reason),
    };
    format!("[{}] {}", event.room, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_wordchain::{CancelReason, Constraint, Player, PlayerId, Rejection, RoomId};

    fn in_room(event: GameEvent) -> RoomEvent {
        RoomEvent {
            room: RoomId::from("lobby"),
            event,
        }
    }

    #[test]
    fn test_turn_announcement() {
        let text = render(&in_room(GameEvent::TurnAnnounced {
            player: Player::new("a", "Alice"),
            constraint: Constraint::StartsWith('t'),
            min_length: 3,
            timeout_secs: 35,
            stage_number: 1,
            recent_words: vec!["cat".to_string()],
        }));
        assert_eq!(
            text,
            "[lobby] Alice's turn! Stage 1: 3 letters or more, 35s, word starts with 'T'\nRecent words: cat"
        );
    }

    #[test]
    fn test_rejection_and_cancellation() {
        let rejected = render(&in_room(GameEvent::WordRejected {
            player: PlayerId::from("bob"),
            reason: Rejection::AlreadyUsed,
        }));
        assert_eq!(rejected, "[lobby] bob: Word was already used");

        let cancelled = render(&in_room(GameEvent::SessionCancelled {
            reason: CancelReason::NotEnoughPlayers {
                joined: 1,
                required: 2,
            },
        }));
        assert_eq!(
            cancelled,
            "[lobby] Game cancelled: only 1 of 2 required players joined"
        );
    }

    #[test]
    fn test_victory_without_total() {
        let text = render(&in_room(GameEvent::SessionEnded {
            winner: Player::new("a", "Alice"),
            reward: 10,
            total: None,
        }));
        assert_eq!(text, "[lobby] VICTORY! Alice wins +10 points");
    }
}
