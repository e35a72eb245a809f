//! Board state: piece placement plus the auxiliary game state

use crate::piece::{Color, Piece, Role};
use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastlingSide {
    KingSide,
    QueenSide,
}

impl CastlingSide {
    pub const ALL: [CastlingSide; 2] = [CastlingSide::KingSide, CastlingSide::QueenSide];

    pub fn rook_home_col(self) -> i32 {
        match self {
            CastlingSide::KingSide => 7,
            CastlingSide::QueenSide => 0,
        }
    }

    pub fn king_to_col(self) -> i32 {
        match self {
            CastlingSide::KingSide => 6,
            CastlingSide::QueenSide => 2,
        }
    }

    /// Where the rook lands, also the square the king crosses.
    pub fn rook_to_col(self) -> i32 {
        match self {
            CastlingSide::KingSide => 5,
            CastlingSide::QueenSide => 3,
        }
    }

    /// Columns strictly between the king and the rook.
    pub fn between_cols(self) -> &'static [i32] {
        match self {
            CastlingSide::KingSide => &[5, 6],
            CastlingSide::QueenSide => &[1, 2, 3],
        }
    }
}

pub(crate) const KING_HOME_COL: i32 = 4;

/// Per-side, per-wing castling permissions. Only ever revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        white_king_side: true,
        white_queen_side: true,
        black_king_side: true,
        black_queen_side: true,
    };

    pub const NONE: CastlingRights = CastlingRights {
        white_king_side: false,
        white_queen_side: false,
        black_king_side: false,
        black_queen_side: false,
    };

    pub fn has(&self, color: Color, side: CastlingSide) -> bool {
        match (color, side) {
            (Color::White, CastlingSide::KingSide) => self.white_king_side,
            (Color::White, CastlingSide::QueenSide) => self.white_queen_side,
            (Color::Black, CastlingSide::KingSide) => self.black_king_side,
            (Color::Black, CastlingSide::QueenSide) => self.black_queen_side,
        }
    }

    pub(crate) fn set(&mut self, color: Color, side: CastlingSide, value: bool) {
        let flag = match (color, side) {
            (Color::White, CastlingSide::KingSide) => &mut self.white_king_side,
            (Color::White, CastlingSide::QueenSide) => &mut self.white_queen_side,
            (Color::Black, CastlingSide::KingSide) => &mut self.black_king_side,
            (Color::Black, CastlingSide::QueenSide) => &mut self.black_queen_side,
        };
        *flag = value;
    }

    pub fn revoke(&mut self, color: Color, side: CastlingSide) {
        self.set(color, side, false);
    }

    pub fn revoke_all(&mut self, color: Color) {
        self.revoke(color, CastlingSide::KingSide);
        self.revoke(color, CastlingSide::QueenSide);
    }

    pub fn is_empty(&self) -> bool {
        *self == CastlingRights::NONE
    }
}

const BACK_RANK: [Role; 8] = [
    Role::Rook,
    Role::Knight,
    Role::Bishop,
    Role::Queen,
    Role::King,
    Role::Bishop,
    Role::Knight,
    Role::Rook,
];

/// The complete state of one game at one moment.
///
/// Generator, filter and encoder functions borrow it read-only; only the
/// move applier mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub(crate) board: [[Option<Piece>; 8]; 8],
    pub(crate) turn: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) ep_target: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

impl Position {
    /// The standard initial layout, white to move.
    pub fn new() -> Self {
        let mut position = Position::empty();
        for color in [Color::White, Color::Black] {
            let home = color.home_row() as usize;
            let pawns = color.pawn_row() as usize;
            for (col, role) in BACK_RANK.iter().enumerate() {
                position.board[home][col] = Some(Piece::new(color, *role));
                position.board[pawns][col] = Some(Piece::new(color, Role::Pawn));
            }
        }
        position.castling = CastlingRights::ALL;
        position
    }

    /// An empty board. Not a playable position until both kings are placed.
    pub(crate) fn empty() -> Self {
        Position {
            board: [[None; 8]; 8],
            turn: Color::White,
            castling: CastlingRights::NONE,
            ep_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.row() as usize][square.col() as usize]
    }

    /// Raw-index lookup for input layers; off-board indices read as empty.
    pub fn piece_at_coords(&self, row: i32, col: i32) -> Option<Piece> {
        Square::new(row, col).and_then(|square| self.piece_at(square))
    }

    pub fn is_occupied(&self, square: Square) -> bool {
        self.piece_at(square).is_some()
    }

    pub(crate) fn put(&mut self, square: Square, piece: Option<Piece>) {
        self.board[square.row() as usize][square.col() as usize] = piece;
    }

    pub(crate) fn take(&mut self, square: Square) -> Option<Piece> {
        self.board[square.row() as usize][square.col() as usize].take()
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    pub fn ep_target(&self) -> Option<Square> {
        self.ep_target
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Every occupied square with its piece, row-major.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |square| self.piece_at(square).map(|piece| (square, piece)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, piece)| piece.role == Role::King)
            .map(|(square, _)| square)
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}
