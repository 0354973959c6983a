use crate::board::Board;
use crate::types::*;

pub const HALFKP_PIECE_ORDER: [PieceType; 5] =
    [PieceType::PAWN, PieceType::KNIGHT, PieceType::BISHOP, PieceType::ROOK, PieceType::QUEEN];

/// Own and enemy variant of each non-king piece type.
const PIECE_SLOTS: usize = 2 * HALFKP_PIECE_ORDER.len();

#[inline]
pub fn halfkp_dim() -> usize { 64 * PIECE_SLOTS * 64 }

/// Feature index of `pc` on `s` seen from `perspective`, whose king stands
/// on `ksq`. Black's view is flipped vertically so both sides share weights.
#[inline]
pub fn feature_index(perspective: Color, ksq: Square, pc: Piece, s: Square) -> usize {
    debug_assert!(pc.piece_type() != PieceType::KING && !pc.is_none());
    let slot = 2 * (pc.piece_type().index() - 1) + (pc.color() != perspective) as usize;
    (ksq.relative(perspective).index() * PIECE_SLOTS + slot) * 64 + s.relative(perspective).index()
}

/// HalfKP: king square x (piece, square) for every non-king piece.
pub struct HalfKp;

impl HalfKp {
    pub fn dim(&self) -> usize { halfkp_dim() }

    pub fn active_indices(&self, board: &Board, perspective: Color) -> Vec<usize> {
        let ksq = board.king_square(perspective);
        let mut out = Vec::with_capacity(32);
        for c in Color::BOTH {
            for pt in HALFKP_PIECE_ORDER {
                let pc = Piece::make(c, pt);
                out.extend(board.squares(c, pt).iter().map(|&s| feature_index(perspective, ksq, pc, s)));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn indices_are_in_range_and_distinct() {
        let pos = Position::new();
        for c in Color::BOTH {
            let mut idx = HalfKp.active_indices(pos.board(), c);
            assert_eq!(idx.len(), 30);
            assert!(idx.iter().all(|&i| i < halfkp_dim()));
            idx.sort_unstable();
            idx.dedup();
            assert_eq!(idx.len(), 30);
        }
    }

    #[test]
    fn perspectives_mirror_in_symmetric_position() {
        let pos = Position::new();
        let mut w = HalfKp.active_indices(pos.board(), Color::White);
        let mut b = HalfKp.active_indices(pos.board(), Color::Black);
        w.sort_unstable();
        b.sort_unstable();
        assert_eq!(w, b);
    }
}
