//! Interactive game loop over stdin

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use chess_rules_core::engine::EngineHandle;
use chess_rules_core::{Color, Game, Outcome};

use crate::board;

const HELP: &str = "Commands: <from><to>[promotion] (e2e4, e7e8q), moves, fen, history, help, quit";

pub async fn run(
    mut game: Game,
    engine: Option<EngineHandle>,
    engine_side: Option<Color>,
    hint: bool,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    show(&game);

    let mut consulted = Consulted::default();

    loop {
        if let Some(outcome) = game.outcome() {
            match outcome {
                Outcome::Checkmate { winner } => println!("Checkmate, {} wins", winner),
                Outcome::Stalemate => println!("Stalemate"),
            }
            break;
        }

        let ply = game.history().len();
        if let Some(engine) = engine.as_ref().filter(|engine| engine.is_alive()) {
            if engine_side == Some(game.turn()) {
                if consulted.allows(ply) {
                    if engine_move(engine, &mut game).await {
                        show(&game);
                        continue;
                    }
                    consulted.mark(ply);
                    println!("[WARN] Engine could not move, enter a move for {}", game.turn());
                }
            } else if hint && consulted.allows(ply) {
                consulted.mark(ply);
                match engine.suggest(&game.record()).await {
                    Ok(moves) if !moves.is_empty() => println!("Hint: {}", moves.join(" ")),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "no hint"),
                }
            }
        }

        print!("{} to move> ", game.turn());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => {}
            "quit" | "exit" => break,
            "help" => println!("{}", HELP),
            "fen" => println!("{}", game.record()),
            "history" => println!("{}", game.uci_moves().join(" ")),
            "moves" => {
                let moves: Vec<String> = game
                    .legal_moves_for_side()
                    .iter()
                    .map(|mv| mv.to_string())
                    .collect();
                println!("{}", moves.join(" "));
            }
            input => match game.play_coordinate(input) {
                Ok(_) => show(&game),
                Err(e) => println!("{}", e),
            },
        }
    }

    if let Some(engine) = engine {
        engine.shutdown().await;
    }
    info!(moves = game.history().len(), record = %game.record(), "game over");
    Ok(())
}

/// Remembers the ply the engine was last asked about without a move being
/// played, so commands like `moves` or a typo do not start another search.
#[derive(Debug, Default)]
struct Consulted {
    ply: Option<usize>,
}

impl Consulted {
    fn allows(&self, ply: usize) -> bool {
        self.ply != Some(ply)
    }

    fn mark(&mut self, ply: usize) {
        self.ply = Some(ply);
    }
}

/// Plays the engine's first choice; false if it had none we could apply.
async fn engine_move(engine: &EngineHandle, game: &mut Game) -> bool {
    let moves = match engine.suggest(&game.record()).await {
        Ok(moves) => moves,
        Err(e) => {
            warn!(error = %e, "engine search failed");
            return false;
        }
    };

    let Some(choice) = moves.first() else {
        return false;
    };
    match game.play_coordinate(choice) {
        Ok(mv) => {
            println!("Engine plays {}", mv);
            true
        }
        Err(e) => {
            warn!(error = %e, %choice, "engine suggested an unplayable move");
            false
        }
    }
}

fn show(game: &Game) {
    println!();
    println!("{}", board::render(game.position()));
    if game.is_check() {
        println!("{} is in check", game.turn());
    }
}
