//! Plays random games against shakmaty and compares move lists and records.

use std::collections::BTreeSet;

use chess_rules_core::perft::perft;
use chess_rules_core::{is_checkmate, Game, Position as RulesPosition, Rules};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use shakmaty::{fen::Fen, Chess, EnPassantMode, Move, Position, Role};

fn move_to_uci(mv: &Move) -> String {
    match mv {
        Move::Normal { from, to, promotion, .. } => {
            let promo = promotion
                .map(|r| match r {
                    Role::Queen => "q",
                    Role::Rook => "r",
                    Role::Bishop => "b",
                    Role::Knight => "n",
                    _ => "",
                })
                .unwrap_or("");
            format!("{}{}{}", from, to, promo)
        }
        Move::EnPassant { from, to, .. } => format!("{}{}", from, to),
        Move::Castle { king, rook } => {
            let king_to = if rook.file() > king.file() {
                shakmaty::Square::from_coords(shakmaty::File::G, king.rank())
            } else {
                shakmaty::Square::from_coords(shakmaty::File::C, king.rank())
            };
            format!("{}{}", king, king_to)
        }
        Move::Put { .. } => String::new(),
    }
}

// shakmaty only prints an en passant square when a capture is possible
fn comparable_fields(record: &str) -> Vec<String> {
    record
        .split(' ')
        .enumerate()
        .filter(|(i, _)| *i != 3)
        .map(|(_, field)| field.to_string())
        .collect()
}

#[test]
fn random_games_agree_with_shakmaty() {
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut reference = Chess::default();
        let mut game = Game::new();

        for ply in 0..160 {
            let expected: BTreeSet<String> =
                reference.legal_moves().iter().map(move_to_uci).collect();
            let actual: BTreeSet<String> = game
                .legal_moves_for_side()
                .iter()
                .map(|mv| mv.to_string())
                .collect();
            assert_eq!(actual, expected, "seed {seed} ply {ply} at {}", game.record());

            let theirs = Fen::from_position(&reference, EnPassantMode::Legal).to_string();
            assert_eq!(comparable_fields(&game.record()), comparable_fields(&theirs));
            assert_eq!(game.is_check(), reference.is_check(), "{theirs}");
            assert_eq!(
                is_checkmate(game.turn(), game.position()),
                reference.is_checkmate(),
                "{theirs}"
            );

            let moves: Vec<Move> = reference.legal_moves().into_iter().collect();
            let Some(mv) = moves.choose(&mut rng) else {
                break;
            };
            game.play_coordinate(&move_to_uci(mv)).unwrap();
            reference = match reference.play(mv.clone()) {
                Ok(next) => next,
                Err(_) => panic!("shakmaty rejected its own move {}", move_to_uci(mv)),
            };
        }
    }
}

#[test]
fn tactical_positions_match_shakmaty_move_counts() {
    let records = [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    ];

    for record in records {
        let ours: RulesPosition = record.parse().unwrap();
        let fen: Fen = record.parse().unwrap();
        let theirs: Chess = match fen.into_position(shakmaty::CastlingMode::Standard) {
            Ok(position) => position,
            Err(_) => panic!("shakmaty rejected {record}"),
        };

        assert_eq!(
            perft(&ours, 1, Rules::strict()),
            theirs.legal_moves().len() as u64,
            "{record}"
        );
    }
}
