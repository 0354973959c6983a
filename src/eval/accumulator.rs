use super::features::{feature_index, HalfKp};
use super::PieceObserver;
use crate::board::Board;
use crate::position::DirtyPiece;
use crate::types::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// First layer of a HalfKP network: one `i16` column per feature.
pub struct FeatureTransformer {
    hidden: usize,
    weights: Vec<i16>,
    biases: Vec<i16>,
}

impl FeatureTransformer {
    pub fn new(hidden: usize, weights: Vec<i16>, biases: Vec<i16>) -> Self {
        assert_eq!(weights.len(), HalfKp.dim() * hidden, "weights must be dim x hidden");
        assert_eq!(biases.len(), hidden, "one bias per hidden unit");
        Self { hidden, weights, biases }
    }

    /// Small random weights from a fixed seed, for tests and benchmarks.
    pub fn random(hidden: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let weights = (0..HalfKp.dim() * hidden).map(|_| rng.gen_range(-64..=64)).collect();
        let biases = (0..hidden).map(|_| rng.gen_range(-128..=128)).collect();
        Self::new(hidden, weights, biases)
    }

    pub fn hidden_dim(&self) -> usize { self.hidden }

    #[inline]
    fn column(&self, idx: usize) -> &[i16] { &self.weights[idx * self.hidden..(idx + 1) * self.hidden] }

    fn add(&self, acc: &mut [i32], idx: usize) {
        for (a, &w) in acc.iter_mut().zip(self.column(idx)) {
            *a += w as i32;
        }
    }

    fn sub(&self, acc: &mut [i32], idx: usize) {
        for (a, &w) in acc.iter_mut().zip(self.column(idx)) {
            *a -= w as i32;
        }
    }

    /// Biases plus the columns of every active feature.
    pub fn refresh(&self, board: &Board, perspective: Color) -> Vec<i32> {
        let mut acc: Vec<i32> = self.biases.iter().map(|&b| b as i32).collect();
        for idx in HalfKp.active_indices(board, perspective) {
            self.add(&mut acc, idx);
        }
        acc
    }
}

/// Hidden-layer sums for both perspectives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accumulator {
    pub values: [Vec<i32>; 2],
}

/// One accumulator per ply, updated from dirty pieces. A perspective whose
/// own king moved is rebuilt from scratch.
#[derive(Clone)]
pub struct AccumulatorStack {
    ft: Arc<FeatureTransformer>,
    stack: Vec<Accumulator>,
    refreshes: u64,
}

impl AccumulatorStack {
    pub fn new(ft: Arc<FeatureTransformer>) -> Self { Self { ft, stack: Vec::with_capacity(256), refreshes: 0 } }

    pub fn current(&self) -> Option<&Accumulator> { self.stack.last() }

    pub fn depth(&self) -> usize { self.stack.len() }

    /// Full rebuilds performed so far (resets excluded).
    pub fn refreshes(&self) -> u64 { self.refreshes }

    pub fn compute(&self, board: &Board) -> Accumulator {
        Accumulator { values: [self.ft.refresh(board, Color::White), self.ft.refresh(board, Color::Black)] }
    }
}

impl PieceObserver for AccumulatorStack {
    fn reset(&mut self, board: &Board) {
        self.stack.clear();
        let acc = self.compute(board);
        self.stack.push(acc);
    }

    fn push(&mut self, dirty: &DirtyPiece, board: &Board) {
        let Some(mut next) = self.stack.last().cloned() else {
            let acc = self.compute(board);
            self.stack.push(acc);
            return;
        };
        for perspective in Color::BOTH {
            let own_king = Piece::make(perspective, PieceType::KING);
            if dirty.entries().any(|(pc, _, _)| pc == own_king) {
                next.values[perspective.index()] = self.ft.refresh(board, perspective);
                self.refreshes += 1;
                continue;
            }
            let ksq = board.king_square(perspective);
            let acc = &mut next.values[perspective.index()];
            for (pc, from, to) in dirty.entries() {
                if pc.piece_type() == PieceType::KING {
                    continue;
                }
                if let Some(from) = from {
                    self.ft.sub(acc, feature_index(perspective, ksq, pc, from));
                }
                if let Some(to) = to {
                    self.ft.add(acc, feature_index(perspective, ksq, pc, to));
                }
            }
        }
        self.stack.push(next);
    }

    fn pop(&mut self) { self.stack.pop(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn incremental_matches_refresh_through_capture_and_castle() {
        let ft = Arc::new(FeatureTransformer::random(8, 7));
        let mut pos = Position::with_observer(AccumulatorStack::new(ft));
        let root = pos.observer().current().cloned();
        let mut played = Vec::new();
        for uci in ["e2e4", "d7d5", "e4d5", "g8f6", "g1f3", "f6d5", "f1c4", "e7e6", "e1g1"] {
            let m = pos.parse_uci_move(uci).unwrap();
            pos.do_move(m);
            played.push(m);
            let expected = pos.observer().compute(pos.board());
            assert_eq!(pos.observer().current(), Some(&expected), "after {}", uci);
        }
        assert_eq!(pos.observer().refreshes(), 1);
        assert_eq!(pos.observer().depth(), played.len() + 1);

        for m in played.into_iter().rev() {
            pos.undo_move(m);
        }
        assert_eq!(pos.observer().current().cloned(), root);
        assert_eq!(pos.observer().depth(), 1);
    }

    #[test]
    fn null_move_keeps_accumulator() {
        let ft = Arc::new(FeatureTransformer::random(4, 1));
        let mut pos = Position::with_observer(AccumulatorStack::new(ft));
        let before = pos.observer().current().cloned();
        pos.do_null_move();
        assert_eq!(pos.observer().current().cloned(), before);
        pos.undo_null_move();
        assert_eq!(pos.observer().depth(), 1);
    }
}
