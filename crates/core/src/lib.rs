//! Chess Rules Core Library
//!
//! Board state, legal move generation, check and mate detection, move
//! application and position records for a two-player game, plus a client
//! for an external UCI engine.

pub mod apply;
pub mod engine;
pub mod error;
pub mod game;
pub mod legal;
pub mod movegen;
pub mod moves;
pub mod notation;
pub mod perft;
pub mod piece;
pub mod position;
pub mod square;

pub use apply::apply_move;
pub use error::{Error, Result};
pub use game::{Game, Outcome};
pub use legal::{
    all_legal_moves, is_checkmate, is_king_in_check, is_square_attacked, is_stalemate,
    legal_destinations, legal_destinations_at, legal_moves, legal_moves_with, Rules,
};
pub use movegen::{piece_moves, pseudo_legal_moves};
pub use moves::{parse_coordinate_move, Move, MoveKind};
pub use notation::{board_to_exchange_string, generate_record, parse_record, STARTING_RECORD};
pub use piece::{Color, Piece, Role};
pub use position::{CastlingRights, CastlingSide, Position};
pub use square::{coordinate_string_to_square, square_to_coordinate_string, Square};

/// Basic position information
#[derive(Debug)]
pub struct PositionInfo {
    /// Total number of pieces on the board
    pub piece_count: u32,
    /// Number of legal moves available to the side to move
    pub legal_move_count: u32,
    /// Whose turn it is
    pub side_to_move: Color,
    /// Is the current player in check?
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
}

/// Analyzes a chess position
pub fn analyze_position(position: &Position) -> PositionInfo {
    let side_to_move = position.turn();
    let piece_count = position.piece_count() as u32;
    let legal_move_count = all_legal_moves(position, side_to_move, Rules::strict()).len() as u32;
    let is_check = is_king_in_check(side_to_move, position);

    PositionInfo {
        piece_count,
        legal_move_count,
        side_to_move,
        is_check,
        is_checkmate: is_check && legal_move_count == 0,
        is_stalemate: !is_check && legal_move_count == 0,
    }
}

/// Creates the standard starting position
pub fn starting_position() -> Position {
    Position::new()
}
