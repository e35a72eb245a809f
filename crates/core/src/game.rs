//! A single in-memory game: the position plus its move history

use tracing::info;

use crate::error::Result;
use crate::legal::{all_legal_moves, has_legal_move, is_king_in_check, Rules};
use crate::moves::{parse_coordinate_move, Move};
use crate::notation::generate_record;
use crate::piece::{Color, Role};
use crate::position::Position;
use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
}

impl Position {
    /// `None` while the side to move still has a legal move.
    pub fn outcome_with(&self, rules: Rules) -> Option<Outcome> {
        let side = self.turn();
        if has_legal_move(self, side, rules) {
            return None;
        }
        if is_king_in_check(side, self) {
            Some(Outcome::Checkmate { winner: !side })
        } else {
            Some(Outcome::Stalemate)
        }
    }
}

pub struct Game {
    position: Position,
    rules: Rules,
    initial_record: String,
    moves: Vec<Move>,
    records: Vec<String>,
}

impl Game {
    pub fn new() -> Self {
        Game::with_rules(Rules::strict())
    }

    pub fn with_rules(rules: Rules) -> Self {
        Game::from_position(Position::new(), rules)
    }

    pub fn from_record(record: &str, rules: Rules) -> Result<Self> {
        Ok(Game::from_position(Position::from_record(record)?, rules))
    }

    fn from_position(position: Position, rules: Rules) -> Self {
        Game {
            initial_record: generate_record(&position),
            position,
            rules,
            moves: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn play(&mut self, from: Square, to: Square, promotion: Option<Role>) -> Result<Move> {
        let mv = self.position.play_with(self.rules, from, to, promotion)?;
        let record = generate_record(&self.position);
        info!(ply = self.moves.len() + 1, %mv, %record, "played");

        self.moves.push(mv);
        self.records.push(record);
        Ok(mv)
    }

    /// Plays a coordinate move such as `e2e4` or `e7e8q`.
    pub fn play_coordinate(&mut self, mv: &str) -> Result<Move> {
        let (from, to, promotion) = parse_coordinate_move(mv)?;
        self.play(from, to, promotion)
    }

    pub fn legal_moves_for_side(&self) -> Vec<Move> {
        all_legal_moves(&self.position, self.position.turn(), self.rules)
    }

    pub fn is_check(&self) -> bool {
        is_king_in_check(self.position.turn(), &self.position)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.position.outcome_with(self.rules)
    }

    /// Record of the current position.
    pub fn record(&self) -> String {
        generate_record(&self.position)
    }

    pub fn initial_record(&self) -> &str {
        &self.initial_record
    }

    pub fn history(&self) -> &[Move] {
        &self.moves
    }

    /// Record after each played move, in order.
    pub fn records(&self) -> &[String] {
        &self.records
    }

    /// Moves as coordinate strings, for `position ... moves ...`.
    pub fn uci_moves(&self) -> Vec<String> {
        self.moves.iter().map(|mv| mv.to_string()).collect()
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
