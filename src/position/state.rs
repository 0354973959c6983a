use crate::bitboard::Bitboard;
use crate::types::*;
use crate::zobrist::Key;

/// Pieces that moved, vanished or appeared during one ply, in the order the
/// position touched them. `from == None` means the piece appeared (promotion),
/// `to == None` means it left the board (capture, promoted pawn).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyPiece {
    len: usize,
    piece: [Piece; 3],
    from: [Option<Square>; 3],
    to: [Option<Square>; 3],
}

impl DirtyPiece {
    pub(crate) fn push(&mut self, pc: Piece, from: Option<Square>, to: Option<Square>) {
        debug_assert!(self.len < 3);
        self.piece[self.len] = pc;
        self.from[self.len] = from;
        self.to[self.len] = to;
        self.len += 1;
    }

    pub(crate) fn set_to(&mut self, i: usize, to: Option<Square>) { self.to[i] = to; }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn entries(&self) -> impl Iterator<Item = (Piece, Option<Square>, Option<Square>)> + '_ {
        (0..self.len).map(move |i| (self.piece[i], self.from[i], self.to[i]))
    }
}

/// Everything needed to take back one ply, plus derived data that is cheaper
/// to keep than to recompute.
#[derive(Clone, Debug)]
pub struct StateInfo {
    // Carried forward by do_move
    pub pawn_key: Key,
    pub material_key: Key,
    pub non_pawn_material: [Value; 2],
    pub castling_rights: CastlingRights,
    pub rule50: i32,
    pub plies_from_null: i32,
    pub ep_square: Option<Square>,

    // Recomputed by do_move
    pub key: Key,
    pub checkers: Bitboard,
    pub captured_piece: Piece,
    pub blockers_for_king: [Bitboard; 2],
    pub pinners: [Bitboard; 2],
    pub check_squares: [Bitboard; PieceType::NB],
    pub repetition: i32,
    pub dirty_piece: DirtyPiece,
}

impl Default for StateInfo {
    fn default() -> Self {
        Self {
            pawn_key: 0,
            material_key: 0,
            non_pawn_material: [VALUE_ZERO; 2],
            castling_rights: CastlingRights::NONE,
            rule50: 0,
            plies_from_null: 0,
            ep_square: None,
            key: 0,
            checkers: Bitboard::EMPTY,
            captured_piece: Piece::NONE,
            blockers_for_king: [Bitboard::EMPTY; 2],
            pinners: [Bitboard::EMPTY; 2],
            check_squares: [Bitboard::EMPTY; PieceType::NB],
            repetition: 0,
            dirty_piece: DirtyPiece::default(),
        }
    }
}

impl StateInfo {
    /// New record holding only the carried-forward fields of `self`.
    fn carry_forward(&self) -> StateInfo {
        StateInfo {
            pawn_key: self.pawn_key,
            material_key: self.material_key,
            non_pawn_material: self.non_pawn_material,
            castling_rights: self.castling_rights,
            rule50: self.rule50,
            plies_from_null: self.plies_from_null,
            ep_square: self.ep_square,
            ..StateInfo::default()
        }
    }
}

/// Depth-indexed stack of states. Slot 0 is the state produced by `set()`;
/// the state `n` plies back is `back(n)`. Never empty.
#[derive(Clone, Debug)]
pub struct StateStack {
    states: Vec<StateInfo>,
}

impl Default for StateStack {
    fn default() -> Self { Self::new() }
}

impl StateStack {
    pub fn new() -> Self {
        let mut states = Vec::with_capacity(256);
        states.push(StateInfo::default());
        Self { states }
    }

    /// Plies applied since the root state.
    #[inline]
    pub fn depth(&self) -> usize { self.states.len() - 1 }

    #[inline]
    pub fn top(&self) -> &StateInfo { &self.states[self.states.len() - 1] }

    #[inline]
    pub(crate) fn top_mut(&mut self) -> &mut StateInfo {
        let i = self.states.len() - 1;
        &mut self.states[i]
    }

    /// State `n` plies before the top; `back(0)` is the top.
    #[inline]
    pub fn back(&self, n: usize) -> &StateInfo { &self.states[self.states.len() - 1 - n] }

    pub(crate) fn reset(&mut self) {
        self.states.clear();
        self.states.push(StateInfo::default());
    }

    #[inline]
    pub(crate) fn push_forward(&mut self) {
        let next = self.top().carry_forward();
        self.states.push(next);
    }

    #[inline]
    pub(crate) fn push_copy(&mut self) {
        let next = self.top().clone();
        self.states.push(next);
    }

    #[inline]
    pub(crate) fn pop(&mut self) {
        debug_assert!(self.states.len() > 1, "popping the root state");
        self.states.pop();
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StateInfo> { self.states.iter() }
}
