//! Line-oriented console transport.
//!
//! Each input line is one [`Command`]. Replies go to stdout; game events are
//! rendered by a separate task reading the engine's event channel.

use derive_more::{Display, Error};
use std::str::FromStr;
use std::sync::Arc;
use strictly_wordchain::{
    Automaton, Engine, GameMode, Player, PlayerId, RoomId, Seat, Verdict,
};
use strum::IntoEnumIterator;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

use crate::config::ServerConfig;
use crate::db::ScoreRepository;

/// Entries shown by `leaderboard`.
pub const LEADERBOARD_SIZE: i64 = 10;

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `start <room> [mode]`
    Start {
        /// Room to open.
        room: RoomId,
        /// Mode, or the configured default.
        mode: Option<GameMode>,
    },
    /// `join <room> <player> [display name]`
    Join {
        /// Room to join.
        room: RoomId,
        /// Joining player.
        player: PlayerId,
        /// Display name; the id when absent.
        name: Option<String>,
    },
    /// `bot <room> <name>`
    Bot {
        /// Room to join.
        room: RoomId,
        /// Bot display name.
        name: String,
    },
    /// `say <room> <player> <word>`
    Say {
        /// Room to play in.
        room: RoomId,
        /// Submitting player.
        player: PlayerId,
        /// Submitted text.
        word: String,
    },
    /// `end <room> <actor>`
    End {
        /// Room to stop.
        room: RoomId,
        /// Who asks.
        actor: PlayerId,
    },
    /// `score <player>`
    Score {
        /// Player to look up.
        player: PlayerId,
    },
    /// `leaderboard`
    Leaderboard,
    /// `rooms`
    Rooms,
    /// `rules`
    Rules,
    /// `help`
    Help,
    /// `quit`
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum CommandError {
    /// Blank line.
    #[display("Empty command")]
    Empty,
    /// First word is not a command.
    #[display("Unknown command '{}', try 'help'", command)]
    Unknown {
        /// The word given.
        command: String,
    },
    /// A required argument is missing.
    #[display("'{}' needs <{}>", command, argument)]
    MissingArgument {
        /// The command.
        command: &'static str,
        /// The missing argument.
        argument: &'static str,
    },
    /// The mode name is not known.
    #[display("Unknown mode '{}'", mode)]
    InvalidMode {
        /// The name given.
        mode: String,
    },
}

fn required<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    words
        .next()
        .ok_or(CommandError::MissingArgument { command, argument })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(CommandError::Empty)?;
        let command = head.trim_start_matches('/').to_lowercase();

        let parsed = match command.as_str() {
            "start" => {
                let room = required(&mut words, "start", "room")?.into();
                let mode = words
                    .next()
                    .map(|m| {
                        GameMode::from_str(m).map_err(|_| CommandError::InvalidMode {
                            mode: m.to_string(),
                        })
                    })
                    .transpose()?;
                Self::Start { room, mode }
            }
            "join" => {
                let room = required(&mut words, "join", "room")?.into();
                let player = required(&mut words, "join", "player")?.into();
                let name: Vec<&str> = words.collect();
                Self::Join {
                    room,
                    player,
                    name: (!name.is_empty()).then(|| name.join(" ")),
                }
            }
            "bot" => Self::Bot {
                room: required(&mut words, "bot", "room")?.into(),
                name: required(&mut words, "bot", "name")?.to_string(),
            },
            "say" => {
                let room = required(&mut words, "say", "room")?.into();
                let player = required(&mut words, "say", "player")?.into();
                // The rest of the line is the submission, spaces and all.
                let rest: Vec<&str> = words.collect();
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "say",
                        argument: "word",
                    });
                }
                Self::Say {
                    room,
                    player,
                    word: rest.join(" "),
                }
            }
            "end" => Self::End {
                room: required(&mut words, "end", "room")?.into(),
                actor: required(&mut words, "end", "actor")?.into(),
            },
            "score" => Self::Score {
                player: required(&mut words, "score", "player")?.into(),
            },
            "leaderboard" => Self::Leaderboard,
            "rooms" => Self::Rooms,
            "rules" => Self::Rules,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => {
                return Err(CommandError::Unknown {
                    command: head.to_string(),
                });
            }
        };
        Ok(parsed)
    }
}

/// Game rules as shown to players.
pub fn rules_text() -> String {
    let modes: Vec<String> = GameMode::iter().map(|m| m.to_string()).collect();
    format!(
        "Word Chain rules:\n\
         - Players take turns to enter words.\n\
         - In chain mode the word must start with the last letter of the previous word.\n\
         - Words must meet the required length, which increases as the game progresses.\n\
         - No repeating words within the same game.\n\
         - If you fail to submit in time, you're eliminated!\n\
         The last player standing wins.\n\
         Modes: {}",
        modes.join(", ")
    )
}

/// Command reference.
pub fn help_text() -> &'static str {
    "Commands:\n\
     start <room> [mode]          open a game\n\
     join <room> <player> [name]  join a forming game\n\
     bot <room> <name>            add an automated player\n\
     say <room> <player> <word>   play a word\n\
     end <room> <actor>           stop a game (admins only)\n\
     score <player>               points and rank\n\
     leaderboard                  top players\n\
     rooms                        live games\n\
     rules                        game rules\n\
     quit                         exit"
}

/// Console front end over an [`Engine`].
#[derive(Debug, Clone)]
pub struct Console {
    engine: Engine,
    scores: Arc<ScoreRepository>,
    config: ServerConfig,
}

impl Console {
    /// Creates a console.
    pub fn new(engine: Engine, scores: Arc<ScoreRepository>, config: ServerConfig) -> Self {
        Self {
            engine,
            scores,
            config,
        }
    }

    /// Runs a command and returns the reply, if any.
    ///
    /// Game progress is reported through events, so successful plays reply
    /// with nothing.
    #[instrument(skip(self))]
    pub async fn execute(&self, command: Command) -> Option<String> {
        match command {
            Command::Start { room, mode } => {
                let mode = mode.unwrap_or(*self.config.default_mode());
                self.engine
                    .request_start(room, mode)
                    .await
                    .err()
                    .map(|e| e.to_string())
            }
            Command::Join { room, player, name } => {
                let name = name.unwrap_or_else(|| player.to_string());
                let seat = Seat::human(Player::new(player, name));
                self.engine
                    .request_join(&room, seat)
                    .await
                    .err()
                    .map(|e| e.to_string())
            }
            Command::Bot { room, name } => {
                let player = Player::new(format!("bot:{}", name), name);
                let seat = Seat::with_taker(
                    player,
                    Arc::new(Automaton::new(self.config.automaton_think())),
                );
                self.engine
                    .request_join(&room, seat)
                    .await
                    .err()
                    .map(|e| e.to_string())
            }
            Command::Say { room, player, word } => {
                match self.engine.submit_word(&room, &player, &word).await {
                    Ok(Verdict::Accepted { word }) => {
                        debug!(%word, "Word played");
                        None
                    }
                    Ok(Verdict::Rejected(_)) => None,
                    Err(e) => Some(e.to_string()),
                }
            }
            Command::End { room, actor } => {
                if !self.config.is_admin(&actor) {
                    warn!(%actor, "Unauthorised force end");
                    return Some(format!("{} is not allowed to end games", actor));
                }
                self.engine
                    .force_end(&room, &actor)
                    .await
                    .err()
                    .map(|e| e.to_string())
            }
            Command::Score { player } => Some(self.score_line(&player)),
            Command::Leaderboard => Some(self.leaderboard_text()),
            Command::Rooms => {
                let rooms = self.engine.rooms().await;
                if rooms.is_empty() {
                    Some("No active games".to_string())
                } else {
                    let names: Vec<String> = rooms.iter().map(ToString::to_string).collect();
                    Some(format!("Active games: {}", names.join(", ")))
                }
            }
            Command::Rules => Some(rules_text()),
            Command::Help => Some(help_text().to_string()),
            Command::Quit => None,
        }
    }

    /// Points and rank for one player.
    pub fn score_line(&self, player: &PlayerId) -> String {
        let points = self.scores.points(player.as_str());
        let rank = self.scores.rank(player.as_str());
        match (points, rank) {
            (Ok(points), Ok(Some(rank))) => format!("{}: {} points (rank {})", player, points, rank),
            (Ok(points), Ok(None)) => format!("{}: {} points (unranked)", player, points),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Score lookup failed");
                format!("Could not read score: {}", e.message)
            }
        }
    }

    /// The top of the leaderboard.
    pub fn leaderboard_text(&self) -> String {
        match self.scores.leaderboard(LEADERBOARD_SIZE) {
            Ok(top) if top.is_empty() => "No scores yet".to_string(),
            Ok(top) => {
                let mut text = String::from("Leaderboard:");
                for (position, score) in top.iter().enumerate() {
                    text.push_str(&format!(
                        "\n{}. {} - {}",
                        position + 1,
                        score.player_id(),
                        score.points()
                    ));
                }
                text
            }
            Err(e) => {
                warn!(error = %e, "Leaderboard lookup failed");
                format!("Could not read leaderboard: {}", e.message)
            }
        }
    }

    /// Reads commands from `input` until EOF or `quit`, writing replies to
    /// `output`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading or writing fails.
    #[instrument(skip_all)]
    pub async fn run<R, W>(&self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Console ready");
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let reply = match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => self.execute(command).await,
                Err(CommandError::Empty) => None,
                Err(e) => {
                    debug!(%line, error = %e, "Unparsed line");
                    Some(e.to_string())
                }
            };
            if let Some(reply) = reply {
                output.write_all(reply.as_bytes()).await?;
                output.write_all(b"\n").await?;
                output.flush().await?;
            }
        }
        info!("Console closed");
        Ok(())
    }
}
