//! Move application
//!
//! `play` validates against the legality filter before touching the board,
//! so a rejected move leaves the position exactly as it was.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::legal::{legal_moves_with, Rules};
use crate::moves::{Move, MoveKind};
use crate::piece::{Color, Piece, Role};
use crate::position::{CastlingSide, Position};
use crate::square::Square;

/// Plays `from -> to` for the side to move under strict rules, promoting
/// to a queen if the move is a promotion.
pub fn apply_move(position: &mut Position, from: Square, to: Square) -> Result<Move> {
    position.play(from, to, None)
}

impl Position {
    pub fn play(&mut self, from: Square, to: Square, promotion: Option<Role>) -> Result<Move> {
        self.play_with(Rules::strict(), from, to, promotion)
    }

    /// Finds the legal move matching `from`, `to` and `promotion` and plays
    /// it. A missing promotion role means queen.
    pub fn play_with(
        &mut self,
        rules: Rules,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Result<Move> {
        let piece = self.piece_at(from).ok_or(Error::EmptySquare { square: from })?;
        if piece.color != self.turn {
            return Err(Error::WrongSide {
                square: from,
                turn: self.turn,
            });
        }

        let found = legal_moves_with(self, from, rules)
            .into_iter()
            .find(|mv| mv.to == to && promotion_matches(mv, promotion));

        match found {
            Some(mv) => {
                self.apply_unchecked(&mv);
                debug!(%mv, record = %self, "move applied");
                Ok(mv)
            }
            None => {
                let attempted = Move::new(
                    from,
                    to,
                    promotion.map_or(MoveKind::Normal, MoveKind::Promotion),
                );
                warn!(mv = %attempted, "rejected illegal move");
                Err(Error::illegal(&attempted))
            }
        }
    }

    /// Plays a move produced by the legality filter, checking that it is
    /// still one of the side to move's legal moves.
    pub fn play_move(&mut self, mv: &Move, rules: Rules) -> Result<()> {
        let piece = self.piece_at(mv.from).ok_or(Error::EmptySquare { square: mv.from })?;
        if piece.color != self.turn {
            return Err(Error::WrongSide {
                square: mv.from,
                turn: self.turn,
            });
        }
        if !legal_moves_with(self, mv.from, rules).contains(mv) {
            return Err(Error::illegal(mv));
        }
        self.apply_unchecked(mv);
        Ok(())
    }

    /// Applies `mv` without validation. Used for real moves after the
    /// legality check and for simulation on scratch copies.
    pub(crate) fn apply_unchecked(&mut self, mv: &Move) {
        let Some(piece) = self.take(mv.from) else {
            return;
        };
        let mut captured = self.is_occupied(mv.to);

        match mv.kind {
            MoveKind::EnPassant => {
                if let Some(victim) = Square::new(mv.from.row(), mv.to.col()) {
                    captured |= self.take(victim).is_some();
                }
            }
            MoveKind::Castle(side) => {
                let row = mv.from.row();
                if let (Some(rook_from), Some(rook_to)) = (
                    Square::new(row, side.rook_home_col()),
                    Square::new(row, side.rook_to_col()),
                ) {
                    let rook = self.take(rook_from);
                    self.put(rook_to, rook);
                }
            }
            _ => {}
        }

        self.update_castling_rights(piece, mv.from, mv.to);

        let placed = match mv.kind {
            MoveKind::Promotion(role) => Piece::new(piece.color, role),
            _ => piece,
        };
        self.put(mv.to, Some(placed));

        self.ep_target = match mv.kind {
            MoveKind::DoublePush => mv.from.offset(piece.color.forward(), 0),
            _ => None,
        };

        if piece.role == Role::Pawn || captured {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if piece.color == Color::Black {
            self.fullmove_number += 1;
        }
        self.turn = !piece.color;
    }

    fn update_castling_rights(&mut self, piece: Piece, from: Square, to: Square) {
        if piece.role == Role::King {
            self.castling.revoke_all(piece.color);
        }

        for color in [Color::White, Color::Black] {
            for side in CastlingSide::ALL {
                let Some(corner) = Square::new(color.home_row(), side.rook_home_col()) else {
                    continue;
                };
                let rook_left = piece.role == Role::Rook && piece.color == color && from == corner;
                // a capture on the corner takes the rook with it
                if rook_left || to == corner {
                    self.castling.revoke(color, side);
                }
            }
        }
    }
}

fn promotion_matches(mv: &Move, requested: Option<Role>) -> bool {
    match mv.kind {
        MoveKind::Promotion(role) => role == requested.unwrap_or(Role::Queen),
        _ => requested.is_none(),
    }
}
