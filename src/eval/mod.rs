//! Hooks for incremental evaluators. A position reports every piece that
//! moved, appeared or vanished, so an evaluator can update its state
//! instead of recomputing it.

pub mod accumulator;
pub mod features;

use crate::board::Board;
use crate::position::DirtyPiece;

pub use accumulator::{Accumulator, AccumulatorStack, FeatureTransformer};
pub use features::HalfKp;

/// Receives piece-placement deltas in lockstep with do/undo. `push` runs
/// after the board is updated; `pop` mirrors the matching `push`. Null
/// moves push an empty delta.
pub trait PieceObserver {
    /// Position was (re)loaded; discard history and start from `board`.
    fn reset(&mut self, board: &Board);
    fn push(&mut self, dirty: &DirtyPiece, board: &Board);
    fn pop(&mut self);
}

impl PieceObserver for () {
    #[inline(always)]
    fn reset(&mut self, _: &Board) {}
    #[inline(always)]
    fn push(&mut self, _: &DirtyPiece, _: &Board) {}
    #[inline(always)]
    fn pop(&mut self) {}
}
