//! Pseudo-legal move generation
//!
//! Destinations a piece could reach by its movement pattern and the board
//! occupancy alone. Whether the move exposes the mover's king is the
//! legality filter's concern, as are castling and en passant.

use crate::piece::{Piece, Role};
use crate::position::Position;
use crate::square::Square;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ORTHOGONALS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Pseudo-legal destinations of whatever stands on `from`.
pub fn pseudo_legal_moves(position: &Position, from: Square) -> Vec<Square> {
    match position.piece_at(from) {
        Some(piece) => piece_moves(piece, from, position),
        None => Vec::new(),
    }
}

/// Pseudo-legal destinations of `piece` standing on `from`.
pub fn piece_moves(piece: Piece, from: Square, position: &Position) -> Vec<Square> {
    match piece.role {
        Role::Pawn => pawn_moves(piece, from, position),
        Role::Knight => step_moves(piece, from, position, &KNIGHT_OFFSETS),
        Role::Bishop => slide_moves(piece, from, position, &DIAGONALS),
        Role::Rook => slide_moves(piece, from, position, &ORTHOGONALS),
        Role::Queen => {
            let mut moves = slide_moves(piece, from, position, &DIAGONALS);
            moves.extend(slide_moves(piece, from, position, &ORTHOGONALS));
            moves
        }
        Role::King => step_moves(piece, from, position, &KING_OFFSETS),
    }
}

fn pawn_moves(piece: Piece, from: Square, position: &Position) -> Vec<Square> {
    let mut moves = Vec::new();
    let forward = piece.color.forward();

    if let Some(one) = from.offset(forward, 0) {
        if !position.is_occupied(one) {
            moves.push(one);

            if from.row() == piece.color.pawn_row() {
                if let Some(two) = from.offset(2 * forward, 0) {
                    if !position.is_occupied(two) {
                        moves.push(two);
                    }
                }
            }
        }
    }

    for d_col in [-1, 1] {
        if let Some(target) = from.offset(forward, d_col) {
            if matches!(position.piece_at(target), Some(other) if other.color != piece.color) {
                moves.push(target);
            }
        }
    }

    moves
}

fn step_moves(
    piece: Piece,
    from: Square,
    position: &Position,
    offsets: &[(i32, i32)],
) -> Vec<Square> {
    offsets
        .iter()
        .filter_map(|&(d_row, d_col)| from.offset(d_row, d_col))
        .filter(|&target| !matches!(position.piece_at(target), Some(other) if other.color == piece.color))
        .collect()
}

fn slide_moves(
    piece: Piece,
    from: Square,
    position: &Position,
    directions: &[(i32, i32)],
) -> Vec<Square> {
    let mut moves = Vec::new();

    for &(d_row, d_col) in directions {
        let mut current = from;
        while let Some(next) = current.offset(d_row, d_col) {
            match position.piece_at(next) {
                None => moves.push(next),
                Some(other) => {
                    if other.color != piece.color {
                        moves.push(next);
                    }
                    break;
                }
            }
            current = next;
        }
    }

    moves
}
