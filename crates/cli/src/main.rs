use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use chess_rules_core::engine::{EngineConfig, EngineHandle};
use chess_rules_core::perft::divide;
use chess_rules_core::{analyze_position, Color, Game, Outcome, Position, Rules};

mod board;
mod play;

#[derive(Parser)]
#[command(name = "chess-rules")]
#[command(about = "Play, replay and count chess positions from the terminal")]
struct Cli {
    /// Engine settings as a JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Engine binary (overrides the config file)
    #[arg(long, global = true)]
    engine_path: Option<String>,

    /// Engine search depth (overrides the config file)
    #[arg(long, global = true)]
    engine_depth: Option<u8>,

    /// Number of engine suggestions (overrides the config file)
    #[arg(long, global = true)]
    multipv: Option<u8>,

    /// Allow castling across an attacked square
    #[arg(long, global = true)]
    lenient: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a game, typing moves like e2e4 or e7e8q
    Play {
        /// Start from this position record instead of the initial position
        #[arg(long)]
        fen: Option<String>,

        /// Let the engine answer for this side
        #[arg(long, value_enum)]
        engine: Option<Side>,

        /// Show engine suggestions before each move
        #[arg(long)]
        hint: bool,
    },
    /// Apply a list of moves and print the resulting record
    Record {
        #[arg(long)]
        fen: Option<String>,

        moves: Vec<String>,
    },
    /// Count leaf positions to a fixed depth, per first move
    Perft {
        depth: u32,

        #[arg(long)]
        fen: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let rules = if cli.lenient {
        Rules::lenient()
    } else {
        Rules::strict()
    };

    match &cli.command {
        Command::Play { fen, engine, hint } => {
            let game = new_game(fen.as_deref(), rules)?;
            let engine_side = engine.map(Color::from);
            let handle = if engine_side.is_some() || *hint {
                start_engine(engine_config(&cli)?).await
            } else {
                None
            };
            play::run(game, handle, engine_side, *hint).await
        }
        Command::Record { fen, moves } => record(fen.as_deref(), moves, rules),
        Command::Perft { depth, fen } => perft(fen.as_deref(), *depth, rules),
    }
}

fn new_game(fen: Option<&str>, rules: Rules) -> Result<Game> {
    match fen {
        Some(record) => Game::from_record(record, rules)
            .with_context(|| format!("invalid position record: {record}")),
        None => Ok(Game::with_rules(rules)),
    }
}

fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(path) = &cli.engine_path {
        config.path = path.clone();
    }
    if let Some(depth) = cli.engine_depth {
        config.depth = depth;
    }
    if let Some(multipv) = cli.multipv {
        config.multipv = multipv;
    }
    Ok(config)
}

async fn start_engine(config: EngineConfig) -> Option<EngineHandle> {
    let path = config.path.clone();
    match EngineHandle::start(config).await {
        Ok(handle) => {
            println!("[OK] Engine ready: {}", path);
            Some(handle)
        }
        Err(e) => {
            warn!(error = %e, "engine unavailable");
            println!("[WARN] Engine not available: {}", e);
            println!("   Continuing without engine...");
            None
        }
    }
}

fn record(fen: Option<&str>, moves: &[String], rules: Rules) -> Result<()> {
    let mut game = new_game(fen, rules)?;

    for (index, mv) in moves.iter().enumerate() {
        game.play_coordinate(mv)
            .with_context(|| format!("move {} ({}) rejected", index + 1, mv))?;
    }

    println!("{}", game.record());
    match game.outcome() {
        Some(Outcome::Checkmate { winner }) => println!("Checkmate, {} wins", winner),
        Some(Outcome::Stalemate) => println!("Stalemate"),
        None if game.is_check() => println!("{} is in check", game.turn()),
        None => {}
    }
    Ok(())
}

fn perft(fen: Option<&str>, depth: u32, rules: Rules) -> Result<()> {
    let position = match fen {
        Some(record) => record
            .parse::<Position>()
            .with_context(|| format!("invalid position record: {record}"))?,
        None => Position::new(),
    };

    let info = analyze_position(&position);
    println!("{}", board::render(&position));
    println!(
        "{} to move, {} pieces, {} legal moves",
        info.side_to_move, info.piece_count, info.legal_move_count
    );
    println!();

    let started = Instant::now();
    let counts = divide(&position, depth, rules);
    for (mv, nodes) in &counts {
        println!("{}: {}", mv, nodes);
    }
    let total: u64 = if depth == 0 {
        1
    } else {
        counts.iter().map(|(_, nodes)| nodes).sum()
    };

    println!();
    println!("Nodes searched: {}", total);
    println!("Time: {}ms", started.elapsed().as_millis());
    Ok(())
}
