//! Move-path enumeration for validating the move generator

use crate::legal::{all_legal_moves, Rules};
use crate::moves::Move;
use crate::position::Position;

/// Number of leaf nodes `depth` plies below `position`.
pub fn perft(position: &Position, depth: u32, rules: Rules) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = all_legal_moves(position, position.turn(), rules);
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .iter()
        .map(|mv| {
            let mut child = position.clone();
            child.apply_unchecked(mv);
            perft(&child, depth - 1, rules)
        })
        .sum()
}

/// Per-move breakdown of [`perft`] for the side to move.
pub fn divide(position: &Position, depth: u32, rules: Rules) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }

    all_legal_moves(position, position.turn(), rules)
        .into_iter()
        .map(|mv| {
            let mut child = position.clone();
            child.apply_unchecked(&mv);
            (mv, perft(&child, depth - 1, rules))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(record: &str, depth: u32) -> u64 {
        let position: Position = record.parse().unwrap();
        perft(&position, depth, Rules::strict())
    }

    #[test]
    fn test_initial_position() {
        let position = Position::new();
        assert_eq!(perft(&position, 0, Rules::strict()), 1);
        assert_eq!(perft(&position, 1, Rules::strict()), 20);
        assert_eq!(perft(&position, 2, Rules::strict()), 400);
        assert_eq!(perft(&position, 3, Rules::strict()), 8902);
    }

    #[test]
    fn test_kiwipete() {
        let record = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        assert_eq!(count(record, 1), 48);
        assert_eq!(count(record, 2), 2039);
    }

    #[test]
    fn test_en_passant_heavy_endgame() {
        let record = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
        assert_eq!(count(record, 1), 14);
        assert_eq!(count(record, 2), 191);
        assert_eq!(count(record, 3), 2812);
    }

    #[test]
    fn test_promotions_and_castling() {
        let record = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
        assert_eq!(count(record, 1), 6);
        assert_eq!(count(record, 2), 264);
    }

    #[test]
    fn test_divide_sums_to_perft() {
        let position = Position::new();
        let split = divide(&position, 2, Rules::strict());
        assert_eq!(split.len(), 20);
        assert!(split.iter().all(|(_, nodes)| *nodes == 20));
        assert_eq!(split.iter().map(|(_, nodes)| nodes).sum::<u64>(), 400);
    }
}
