//! Moves and their coordinate-string encoding (`e2e4`, `e7e8q`)

use std::fmt;

use crate::error::{Error, Result};
use crate::piece::Role;
use crate::position::CastlingSide;
use crate::square::{coordinate_string_to_square, Square};

/// How a move is carried out beyond relocating the piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    /// Pawn advancing two squares from its starting rank.
    DoublePush,
    /// Pawn capturing onto the en-passant target.
    EnPassant,
    Castle(CastlingSide),
    Promotion(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
}

impl Move {
    pub fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Move { from, to, kind }
    }

    pub fn promotion(&self) -> Option<Role> {
        match self.kind {
            MoveKind::Promotion(role) => Some(role),
            _ => None,
        }
    }

    pub fn is_castle(&self) -> bool {
        matches!(self.kind, MoveKind::Castle(_))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion() {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

/// Parses a coordinate move into origin, destination and optional
/// promotion role. Does not check legality.
pub fn parse_coordinate_move(s: &str) -> Result<(Square, Square, Option<Role>)> {
    let s = s.trim();
    if !s.is_ascii() || !(s.len() == 4 || s.len() == 5) {
        return Err(Error::InvalidMove(s.to_string()));
    }

    let from = coordinate_string_to_square(&s[0..2]).map_err(|_| Error::InvalidMove(s.to_string()))?;
    let to = coordinate_string_to_square(&s[2..4]).map_err(|_| Error::InvalidMove(s.to_string()))?;

    let promotion = match s[4..].chars().next() {
        None => None,
        Some(ch) => match Role::from_char(ch) {
            Some(role) if Role::PROMOTIONS.contains(&role) => Some(role),
            _ => return Err(Error::InvalidMove(s.to_string())),
        },
    };

    Ok((from, to, promotion))
}
