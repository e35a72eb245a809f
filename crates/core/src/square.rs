//! Board squares and the coordinate strings used to exchange them
//!
//! Row 0 is the top of the stored board (rank 8), column 0 is the a-file.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A square on the 8x8 board. Always in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Returns the square at `(row, col)`, or `None` when off the board.
    pub fn new(row: i32, col: i32) -> Option<Self> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn row(self) -> i32 {
        i32::from(self.row)
    }

    pub fn col(self) -> i32 {
        i32::from(self.col)
    }

    /// Steps by `(d_row, d_col)`, staying on the board.
    pub fn offset(self, d_row: i32, d_col: i32) -> Option<Self> {
        Square::new(self.row() + d_row, self.col() + d_col)
    }

    /// All 64 squares, row-major from the top-left corner.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Square { row, col }))
    }

    pub fn file_char(self) -> char {
        char::from(b'a' + self.col)
    }

    pub fn rank_char(self) -> char {
        char::from(b'8' - self.row)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        coordinate_string_to_square(s)
    }
}

/// `(6, 4)` -> `"e2"`
pub fn square_to_coordinate_string(square: Square) -> String {
    square.to_string()
}

/// `"e2"` -> `(6, 4)`
pub fn coordinate_string_to_square(s: &str) -> Result<Square> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return Err(Error::InvalidSquare(s.to_string()));
    }

    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(Error::InvalidSquare(s.to_string()));
    }

    Ok(Square {
        row: b'8' - rank,
        col: file - b'a',
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_strings() {
        let e2 = Square::new(6, 4).unwrap();
        assert_eq!(square_to_coordinate_string(e2), "e2");
        assert_eq!(coordinate_string_to_square("e2").unwrap(), e2);
        assert_eq!(coordinate_string_to_square("a8").unwrap(), Square::new(0, 0).unwrap());
        assert_eq!(coordinate_string_to_square("h1").unwrap(), Square::new(7, 7).unwrap());
    }

    #[test]
    fn test_rejects_bad_coordinates() {
        for bad in ["", "e", "e9", "i1", "e22", "11"] {
            assert!(coordinate_string_to_square(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_off_board_is_none() {
        assert!(Square::new(-1, 0).is_none());
        assert!(Square::new(0, 8).is_none());
        assert!(Square::new(7, 7).unwrap().offset(1, 0).is_none());
        assert_eq!(Square::all().count(), 64);
    }
}
