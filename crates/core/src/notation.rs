//! Position records in the standard six-field exchange format (FEN)
//!
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::piece::{Color, Piece, Role};
use crate::position::{CastlingRights, CastlingSide, Position};
use crate::square::{coordinate_string_to_square, Square};

pub const STARTING_RECORD: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Piece placement field: row 0 first, empty runs as digits.
pub fn board_to_exchange_string(position: &Position) -> String {
    let mut out = String::with_capacity(64);

    for row in 0..8 {
        let mut empty = 0;
        for col in 0..8 {
            match position.piece_at_coords(row, col) {
                None => empty += 1,
                Some(piece) => {
                    if empty > 0 {
                        out.push_str(&empty.to_string());
                        empty = 0;
                    }
                    out.push(piece.char());
                }
            }
        }
        if empty > 0 {
            out.push_str(&empty.to_string());
        }
        if row < 7 {
            out.push('/');
        }
    }

    out
}

/// `KQkq` subset in fixed order, or `-`.
pub fn castling_rights_string(rights: CastlingRights) -> String {
    let flags = [
        (rights.white_king_side, 'K'),
        (rights.white_queen_side, 'Q'),
        (rights.black_king_side, 'k'),
        (rights.black_queen_side, 'q'),
    ];

    let out: String = flags
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, ch)| *ch)
        .collect();

    if out.is_empty() {
        "-".to_string()
    } else {
        out
    }
}

/// The full six-field record.
pub fn generate_record(position: &Position) -> String {
    let ep = position
        .ep_target()
        .map_or_else(|| "-".to_string(), |square| square.to_string());

    format!(
        "{} {} {} {} {} {}",
        board_to_exchange_string(position),
        position.turn().char(),
        castling_rights_string(position.castling_rights()),
        ep,
        position.halfmove_clock(),
        position.fullmove_number(),
    )
}

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidRecord(reason.into())
}

/// Parses a record. The two counters may be omitted and default to `0 1`.
pub fn parse_record(record: &str) -> Result<Position> {
    let mut fields = record.split_whitespace();
    let mut position = Position::empty();

    let placement = fields.next().ok_or_else(|| invalid("empty record"))?;
    parse_placement(placement, &mut position)?;

    for color in [Color::White, Color::Black] {
        let kings = position
            .pieces_of(color)
            .filter(|(_, piece)| piece.role == Role::King)
            .count();
        if kings != 1 {
            return Err(invalid(format!("expected one {} king, found {}", color, kings)));
        }
    }

    position.turn = match fields.next() {
        Some("w") => Color::White,
        Some("b") => Color::Black,
        Some(other) => return Err(invalid(format!("bad side to move {:?}", other))),
        None => return Err(invalid("missing side to move")),
    };

    let castling = fields.next().ok_or_else(|| invalid("missing castling field"))?;
    if castling != "-" {
        for ch in castling.chars() {
            let (color, side) = match ch {
                'K' => (Color::White, CastlingSide::KingSide),
                'Q' => (Color::White, CastlingSide::QueenSide),
                'k' => (Color::Black, CastlingSide::KingSide),
                'q' => (Color::Black, CastlingSide::QueenSide),
                _ => return Err(invalid(format!("bad castling flag {:?}", ch))),
            };
            position.castling.set(color, side, true);
        }
    }

    let ep = fields.next().ok_or_else(|| invalid("missing en-passant field"))?;
    if ep != "-" {
        let square = coordinate_string_to_square(ep).map_err(|_| invalid(format!("bad en-passant square {:?}", ep)))?;
        if square.row() != 2 && square.row() != 5 {
            return Err(invalid(format!("en-passant square {} is not on the third or sixth rank", square)));
        }
        position.ep_target = Some(square);
    }

    if let Some(halfmove) = fields.next() {
        position.halfmove_clock = halfmove
            .parse()
            .map_err(|_| invalid(format!("bad half-move clock {:?}", halfmove)))?;
    }

    if let Some(fullmove) = fields.next() {
        position.fullmove_number = match fullmove.parse() {
            Ok(n) if n >= 1 => n,
            _ => return Err(invalid(format!("bad full-move number {:?}", fullmove))),
        };
    }

    if fields.next().is_some() {
        return Err(invalid("trailing fields"));
    }

    Ok(position)
}

fn parse_placement(placement: &str, position: &mut Position) -> Result<()> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid(format!("expected 8 ranks, found {}", ranks.len())));
    }

    for (row, rank) in ranks.iter().enumerate() {
        let mut col = 0;
        for ch in rank.chars() {
            if let Some(run) = ch.to_digit(10) {
                if !(1..=8).contains(&run) {
                    return Err(invalid(format!("bad empty run {:?}", ch)));
                }
                col += run as i32;
            } else {
                let piece = Piece::from_char(ch).ok_or_else(|| invalid(format!("bad piece letter {:?}", ch)))?;
                let square = Square::new(row as i32, col).ok_or_else(|| invalid(format!("rank {} too long", 8 - row)))?;
                position.put(square, Some(piece));
                col += 1;
            }
            if col > 8 {
                return Err(invalid(format!("rank {} too long", 8 - row)));
            }
        }
        if col != 8 {
            return Err(invalid(format!("rank {} too short", 8 - row)));
        }
    }

    Ok(())
}

impl Position {
    pub fn from_record(record: &str) -> Result<Self> {
        parse_record(record)
    }

    pub fn record(&self) -> String {
        generate_record(self)
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_record(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&generate_record(self))
    }
}
