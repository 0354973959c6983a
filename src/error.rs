use crate::types::{Color, Square};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("bad piece placement: {0}")]
    Placement(String),
    #[error("bad side to move: {0}")]
    SideToMove(String),
    #[error("bad castling field: {0}")]
    Castling(String),
    #[error("bad en-passant square: {0}")]
    EnPassant(String),
    #[error("bad move counter: {0}")]
    Counter(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error("{color:?} has {count} kings")]
    KingCount { color: Color, count: usize },
    #[error("{0:?} has more than 16 pieces")]
    TooManyPieces(Color),
    #[error("{0:?} has more than 8 pawns")]
    TooManyPawns(Color),
    #[error("pawn on the first or last rank at {0}")]
    PawnOnBackRank(Square),
    #[error("castling right for {0} has no matching king and rook")]
    BadCastling(Square),
    #[error("invalid en-passant square {0}")]
    BadEnPassant(Square),
    #[error("the side not to move is in check")]
    OpponentInCheck,
    #[error("the side to move is attacked by {0} pieces")]
    TooManyCheckers(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackedError {
    #[error("invalid piece code ending at bit {0}")]
    BadCode(usize),
    #[error("record runs past 256 bits")]
    Overrun,
    #[error("both kings on {0}")]
    KingsCollide(Square),
    #[error(transparent)]
    Setup(#[from] SetupError),
}
