//! Legality filter, check detection and mate detection

use serde::{Deserialize, Serialize};

use crate::movegen::piece_moves;
use crate::moves::{Move, MoveKind};
use crate::piece::{Color, Piece, Role};
use crate::position::{CastlingSide, Position, KING_HOME_COL};
use crate::square::Square;

/// Rule switches that differ between strict chess and the historical
/// behavior of this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rules {
    /// Allow the king to castle across a square attacked by the opponent.
    #[serde(default)]
    pub castle_through_check: bool,
}

impl Rules {
    pub const fn strict() -> Self {
        Rules {
            castle_through_check: false,
        }
    }

    pub const fn lenient() -> Self {
        Rules {
            castle_through_check: true,
        }
    }
}

/// Whether `side`'s king is attacked by any opposing piece.
///
/// A board without a king of that color is never in check.
pub fn is_king_in_check(side: Color, position: &Position) -> bool {
    let Some(king) = position.king_square(side) else {
        return false;
    };

    position
        .pieces_of(!side)
        .any(|(square, piece)| piece_moves(piece, square, position).contains(&king))
}

/// Whether `by` attacks `target`, which may be empty.
pub fn is_square_attacked(target: Square, by: Color, position: &Position) -> bool {
    position.pieces_of(by).any(|(square, piece)| match piece.role {
        // pawns only capture diagonally, and their pushes never attack
        Role::Pawn => {
            target.row() == square.row() + by.forward() && (target.col() - square.col()).abs() == 1
        }
        _ => piece_moves(piece, square, position).contains(&target),
    })
}

/// Legal moves of the piece on `from` under strict rules.
pub fn legal_moves(position: &Position, from: Square) -> Vec<Move> {
    legal_moves_with(position, from, Rules::strict())
}

/// Legal moves of the piece on `from`.
///
/// Independent of whose turn it is; turn order is enforced when a move is
/// played. An empty square yields no moves.
pub fn legal_moves_with(position: &Position, from: Square, rules: Rules) -> Vec<Move> {
    let Some(piece) = position.piece_at(from) else {
        return Vec::new();
    };

    let mut candidates = Vec::new();
    for to in piece_moves(piece, from, position) {
        push_candidate(piece, from, to, &mut candidates);
    }

    match piece.role {
        Role::Pawn => {
            if let Some(mv) = en_passant_candidate(position, piece, from) {
                candidates.push(mv);
            }
        }
        Role::King => castling_candidates(position, piece.color, from, rules, &mut candidates),
        _ => {}
    }

    candidates.retain(|mv| !leaves_king_in_check(position, piece.color, mv));
    candidates
}

/// Destination squares of the piece on `from`, one entry per square even
/// when several promotions land there.
pub fn legal_destinations(position: &Position, from: Square) -> Vec<Square> {
    let mut squares: Vec<Square> = Vec::new();
    for mv in legal_moves(position, from) {
        if !squares.contains(&mv.to) {
            squares.push(mv.to);
        }
    }
    squares
}

/// Raw-index variant of [`legal_destinations`]; off-board input yields
/// nothing.
pub fn legal_destinations_at(position: &Position, row: i32, col: i32) -> Vec<Square> {
    match Square::new(row, col) {
        Some(from) => legal_destinations(position, from),
        None => Vec::new(),
    }
}

/// Every legal move of `side`.
pub fn all_legal_moves(position: &Position, side: Color, rules: Rules) -> Vec<Move> {
    position
        .pieces_of(side)
        .flat_map(|(square, _)| legal_moves_with(position, square, rules))
        .collect()
}

pub fn has_legal_move(position: &Position, side: Color, rules: Rules) -> bool {
    position
        .pieces_of(side)
        .any(|(square, _)| !legal_moves_with(position, square, rules).is_empty())
}

/// In check with no legal move. Castling is never available while in
/// check, so the rule switches do not matter here.
pub fn is_checkmate(side: Color, position: &Position) -> bool {
    is_king_in_check(side, position) && !has_legal_move(position, side, Rules::strict())
}

pub fn is_stalemate(side: Color, position: &Position) -> bool {
    !is_king_in_check(side, position) && !has_legal_move(position, side, Rules::strict())
}

fn push_candidate(piece: Piece, from: Square, to: Square, candidates: &mut Vec<Move>) {
    if piece.role != Role::Pawn {
        candidates.push(Move::new(from, to, MoveKind::Normal));
    } else if to.row() == piece.color.promotion_row() {
        candidates.extend(
            Role::PROMOTIONS
                .iter()
                .map(|&role| Move::new(from, to, MoveKind::Promotion(role))),
        );
    } else if (to.row() - from.row()).abs() == 2 {
        candidates.push(Move::new(from, to, MoveKind::DoublePush));
    } else {
        candidates.push(Move::new(from, to, MoveKind::Normal));
    }
}

fn en_passant_candidate(position: &Position, pawn: Piece, from: Square) -> Option<Move> {
    let target = position.ep_target()?;
    if target.row() != from.row() + pawn.color.forward() || (target.col() - from.col()).abs() != 1 {
        return None;
    }

    // the pawn that just double-stepped stands beside us
    let victim = Square::new(from.row(), target.col())?;
    match position.piece_at(victim) {
        Some(other) if other.role == Role::Pawn && other.color != pawn.color => {
            Some(Move::new(from, target, MoveKind::EnPassant))
        }
        _ => None,
    }
}

fn castling_candidates(
    position: &Position,
    color: Color,
    from: Square,
    rules: Rules,
    candidates: &mut Vec<Move>,
) {
    let row = color.home_row();
    if from.row() != row || from.col() != KING_HOME_COL {
        return;
    }
    if is_king_in_check(color, position) {
        return;
    }

    for side in CastlingSide::ALL {
        if !position.castling_rights().has(color, side) {
            continue;
        }

        let rook_home = position.piece_at_coords(row, side.rook_home_col());
        if rook_home != Some(Piece::new(color, Role::Rook)) {
            continue;
        }

        let path_clear = side
            .between_cols()
            .iter()
            .all(|&col| position.piece_at_coords(row, col).is_none());
        if !path_clear {
            continue;
        }

        if !rules.castle_through_check {
            let crossed = Square::new(row, side.rook_to_col());
            if crossed.is_some_and(|square| is_square_attacked(square, !color, position)) {
                continue;
            }
        }

        if let Some(to) = Square::new(row, side.king_to_col()) {
            candidates.push(Move::new(from, to, MoveKind::Castle(side)));
        }
    }
}

/// Plays `mv` on a copy of the position and looks at `side`'s king.
fn leaves_king_in_check(position: &Position, side: Color, mv: &Move) -> bool {
    let mut scratch = position.clone();
    scratch.apply_unchecked(mv);
    is_king_in_check(side, &scratch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn pos(record: &str) -> Position {
        record.parse().unwrap()
    }

    fn names(moves: &[Move]) -> Vec<String> {
        let mut names: Vec<String> = moves.iter().map(|mv| mv.to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_initial_move_counts() {
        let position = Position::new();
        assert_eq!(all_legal_moves(&position, Color::White, Rules::strict()).len(), 20);
        assert_eq!(all_legal_moves(&position, Color::Black, Rules::strict()).len(), 20);
    }

    #[test]
    fn test_pinned_piece_cannot_leave_line() {
        // bishop on e2 is pinned by the rook on e8
        let position = pos("4r1k1/8/8/8/8/8/4B3/4K3 w - - 0 1");
        assert!(legal_moves(&position, sq("e2")).is_empty());
        assert!(!is_king_in_check(Color::White, &position));
    }

    #[test]
    fn test_must_answer_check() {
        let position = pos("4k3/8/8/8/8/8/3P4/r3K3 w - - 0 1");
        assert!(is_king_in_check(Color::White, &position));
        let moves = all_legal_moves(&position, Color::White, Rules::strict());
        assert_eq!(names(&moves), ["e1e2", "e1f2"]);
    }

    #[test]
    fn test_en_passant_candidate() {
        let position = pos("4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 2");
        let moves = legal_moves(&position, sq("d5"));
        assert_eq!(names(&moves), ["d5d6", "d5e6"]);
        assert!(moves.iter().any(|mv| mv.kind == MoveKind::EnPassant));
    }

    #[test]
    fn test_en_passant_needs_victim_pawn() {
        // target set but the neighbouring square holds a knight
        let position = pos("4k3/8/8/3Pn3/8/8/8/4K3 w - e6 0 2");
        assert_eq!(names(&legal_moves(&position, sq("d5"))), ["d5d6"]);
    }

    #[test]
    fn test_en_passant_exposing_king_is_illegal() {
        // capturing would clear the fifth rank between the rook and the king
        let position = pos("8/8/8/K2Pp2r/8/8/8/7k w - e6 0 2");
        assert_eq!(names(&legal_moves(&position, sq("d5"))), ["d5d6"]);
    }

    #[test]
    fn test_castling_both_sides() {
        let position = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let moves = legal_moves(&position, sq("e1"));
        let castles: Vec<String> = moves
            .iter()
            .filter(|mv| mv.is_castle())
            .map(|mv| mv.to_string())
            .collect();
        assert_eq!(castles, ["e1g1", "e1c1"]);
    }

    #[test]
    fn test_castling_blocked_or_without_rights() {
        let blocked = pos("r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1");
        assert!(!legal_moves(&blocked, sq("e1")).iter().any(Move::is_castle));

        let no_rights = pos("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1");
        assert!(!legal_moves(&no_rights, sq("e1")).iter().any(Move::is_castle));
    }

    #[test]
    fn test_no_castling_out_of_check() {
        let position = pos("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!legal_moves(&position, sq("e1")).iter().any(Move::is_castle));
    }

    #[test]
    fn test_castling_through_attacked_square() {
        // black rook on f8 covers f1, the square the king crosses
        let position = pos("5rk1/8/8/8/8/8/8/4K2R w K - 0 1");

        let strict = legal_moves_with(&position, sq("e1"), Rules::strict());
        assert!(!strict.iter().any(Move::is_castle));

        let lenient = legal_moves_with(&position, sq("e1"), Rules::lenient());
        assert!(lenient.iter().any(Move::is_castle));
    }

    #[test]
    fn test_castling_into_check_is_illegal_even_when_lenient() {
        let position = pos("6rk/8/8/8/8/8/8/4K2R w K - 0 1");
        let lenient = legal_moves_with(&position, sq("e1"), Rules::lenient());
        assert!(!lenient.iter().any(Move::is_castle));
    }

    #[test]
    fn test_promotion_candidates() {
        let position = pos("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let moves = legal_moves(&position, sq("a7"));
        assert_eq!(moves.len(), 8);
        assert_eq!(legal_destinations(&position, sq("a7")).len(), 2);
    }

    #[test]
    fn test_fools_mate() {
        let position = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(is_king_in_check(Color::White, &position));
        assert!(is_checkmate(Color::White, &position));
        assert!(!is_stalemate(Color::White, &position));
        assert!(all_legal_moves(&position, Color::White, Rules::strict()).is_empty());
    }

    #[test]
    fn test_stalemate() {
        let position = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(!is_checkmate(Color::Black, &position));
        assert!(is_stalemate(Color::Black, &position));
    }

    #[test]
    fn test_square_attacked_by_pawn() {
        let position = pos("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        assert!(is_square_attacked(sq("d3"), Color::White, &position));
        assert!(is_square_attacked(sq("f3"), Color::White, &position));
        assert!(!is_square_attacked(sq("e3"), Color::White, &position));
    }

    #[test]
    fn test_off_board_queries() {
        let position = Position::new();
        assert!(legal_destinations_at(&position, -1, 3).is_empty());
        assert!(legal_destinations_at(&position, 8, 8).is_empty());
        assert_eq!(legal_destinations_at(&position, 6, 4).len(), 2);
    }
}
