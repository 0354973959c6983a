// Chess board state: incremental do/undo, legality, hashing and exchange evaluation
pub mod types;
pub mod bitboard;
pub mod zobrist;
pub mod psqt;
pub mod board;
pub mod error;
pub mod position;
pub mod movegen;
pub mod eval;
pub mod perft;

pub use error::{FenError, PackedError, SetupError};
pub use position::{PackedPosition, Position, Setup};
pub use types::{Color, Move, MoveKind, Piece, PieceType, Square};

/// Builds every lookup table up front so the first move does not pay for it.
pub fn init() {
    bitboard::init();
    zobrist::init();
}
