//! Strictly Wordchain - console host
//!
//! Plays word chain games on stdin/stdout and manages the score database.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use strictly_wordchain::{Engine, RoomEvent};
use strictly_wordchain_server::{
    Cli, Command, Console, ScoreRepository, ServerConfig, WordList, render,
};
use tokio::io::BufReader;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::from_file(&cli.config)?;
    let scores = Arc::new(ScoreRepository::open(config.database_path().clone())?);

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => run_console(config, scores).await,
        Command::Score { player } => {
            let points = scores.points(&player)?;
            match scores.rank(&player)? {
                Some(rank) => println!("{}: {} points (rank {})", player, points, rank),
                None => println!("{}: {} points (unranked)", player, points),
            }
            Ok(())
        }
        Command::Leaderboard { limit } => {
            for (position, score) in scores.leaderboard(limit)?.iter().enumerate() {
                println!("{}. {} - {}", position + 1, score.player_id(), score.points());
            }
            Ok(())
        }
        Command::ResetScores => {
            let removed = scores.reset()?;
            println!("Removed {} scores", removed);
            Ok(())
        }
    }
}

/// Runs the interactive console until `quit` or end of input.
#[instrument(skip_all)]
async fn run_console(config: ServerConfig, scores: Arc<ScoreRepository>) -> Result<()> {
    let words = WordList::from_file(config.words_path())
        .with_context(|| format!("Loading {}", config.words_path().display()))?;
    let engine_config = config.engine_config()?;

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let engine = Engine::new(engine_config, Arc::new(words), scores.clone(), tx);
    let renderer = tokio::spawn(print_events(rx));

    info!("Word chain host ready, type 'help' for commands");
    let console = Console::new(engine, scores, config);
    console
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    renderer.abort();
    Ok(())
}

/// Prints every room event until the engine is dropped.
async fn print_events(mut rx: UnboundedReceiver<RoomEvent>) {
    while let Some(event) = rx.recv().await {
        println!("{}", render(&event));
    }
}
