//! Error types for chess-rules-core

use thiserror::Error;

use crate::engine::EngineError;
use crate::moves::Move;
use crate::piece::Color;
use crate::square::Square;

#[derive(Error, Debug)]
pub enum Error {
    #[error("illegal move: {mv}")]
    IllegalMove { mv: String },

    #[error("no piece on {square}")]
    EmptySquare { square: Square },

    #[error("piece on {square} does not belong to the side to move ({turn})")]
    WrongSide { square: Square, turn: Color },

    #[error("invalid square: {0:?}")]
    InvalidSquare(String),

    #[error("invalid move string: {0:?}")]
    InvalidMove(String),

    #[error("invalid position record: {0}")]
    InvalidRecord(String),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn illegal(mv: &Move) -> Self {
        Error::IllegalMove { mv: mv.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
