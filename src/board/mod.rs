//! Piece placement kept in four redundant shapes: a square array, per-type
//! and per-color bitboards, and dense per-piece square lists. The only ways
//! to change it are `put_piece`, `remove_piece` and `move_piece`, which keep
//! all shapes (and the piece-square score) in lockstep.

use crate::bitboard::Bitboard;
use crate::psqt;
use crate::types::*;

/// Upper bound on pieces of one kind and color (all pawns promoted plus originals).
pub const MAX_PER_PIECE: usize = 16;

#[derive(Clone)]
pub struct Board {
    squares: [Piece; 64],
    by_type: [Bitboard; PieceType::NB],
    by_color: [Bitboard; 2],
    piece_count: [u8; Piece::NB],
    piece_list: [[Square; MAX_PER_PIECE]; Piece::NB],
    index: [u8; 64],
    psq: Score,
}

impl Default for Board {
    fn default() -> Self { Self::new() }
}

impl Board {
    pub fn new() -> Self {
        Self {
            squares: [Piece::NONE; 64],
            by_type: [Bitboard::EMPTY; PieceType::NB],
            by_color: [Bitboard::EMPTY; 2],
            piece_count: [0; Piece::NB],
            piece_list: [[Square::A1; MAX_PER_PIECE]; Piece::NB],
            index: [0; 64],
            psq: Score::ZERO,
        }
    }

    #[inline]
    pub fn piece_on(&self, s: Square) -> Piece { self.squares[s.index()] }

    #[inline]
    pub fn empty(&self, s: Square) -> bool { self.piece_on(s).is_none() }

    #[inline]
    pub fn pieces(&self) -> Bitboard { self.by_type[PieceType::ALL.index()] }

    #[inline]
    pub fn pieces_p(&self, pt: PieceType) -> Bitboard { self.by_type[pt.index()] }

    #[inline]
    pub fn pieces_pp(&self, pt1: PieceType, pt2: PieceType) -> Bitboard { self.pieces_p(pt1) | self.pieces_p(pt2) }

    #[inline]
    pub fn pieces_c(&self, c: Color) -> Bitboard { self.by_color[c.index()] }

    #[inline]
    pub fn pieces_cp(&self, c: Color, pt: PieceType) -> Bitboard { self.pieces_c(c) & self.pieces_p(pt) }

    #[inline]
    pub fn pieces_cpp(&self, c: Color, pt1: PieceType, pt2: PieceType) -> Bitboard {
        self.pieces_c(c) & self.pieces_pp(pt1, pt2)
    }

    #[inline]
    pub fn count(&self, c: Color, pt: PieceType) -> usize { self.count_piece(Piece::make(c, pt)) }

    /// Pieces of exactly this identity; `Piece::make(c, ALL)` gives the color total.
    #[inline]
    pub fn count_piece(&self, pc: Piece) -> usize { self.piece_count[pc.index()] as usize }

    /// Squares holding `c`'s pieces of type `pt`, in unspecified order.
    #[inline]
    pub fn squares(&self, c: Color, pt: PieceType) -> &[Square] {
        let pc = Piece::make(c, pt);
        &self.piece_list[pc.index()][..self.count_piece(pc)]
    }

    /// The square of a piece known to be unique (typically the king).
    #[inline]
    pub fn square(&self, c: Color, pt: PieceType) -> Square {
        debug_assert_eq!(self.count(c, pt), 1);
        self.piece_list[Piece::make(c, pt).index()][0]
    }

    #[inline]
    pub fn king_square(&self, c: Color) -> Square { self.square(c, PieceType::KING) }

    /// Incremental material + placement score, white's point of view.
    #[inline]
    pub fn psq(&self) -> Score { self.psq }

    /// Every piece with its square, grouped by piece identity.
    pub fn piece_locations(&self) -> impl Iterator<Item = (Piece, Square)> + '_ {
        Piece::EACH.into_iter().flat_map(move |pc| {
            self.piece_list[pc.index()][..self.count_piece(pc)].iter().map(move |&s| (pc, s))
        })
    }

    pub(crate) fn clear(&mut self) { *self = Board::new(); }

    pub(crate) fn put_piece(&mut self, pc: Piece, s: Square) {
        debug_assert!(self.empty(s) && !pc.is_none());
        self.squares[s.index()] = pc;
        self.by_type[PieceType::ALL.index()] |= s;
        self.by_type[pc.piece_type().index()] |= s;
        self.by_color[pc.color().index()] |= s;
        let slot = self.piece_count[pc.index()];
        self.index[s.index()] = slot;
        self.piece_list[pc.index()][slot as usize] = s;
        self.piece_count[pc.index()] += 1;
        self.piece_count[Piece::make(pc.color(), PieceType::ALL).index()] += 1;
        self.psq += psqt::psq(pc, s);
    }

    /// Not order preserving: the last square in the piece's list fills the
    /// hole, so a later `put_piece` lands in a different slot.
    pub(crate) fn remove_piece(&mut self, s: Square) {
        let pc = self.squares[s.index()];
        debug_assert!(!pc.is_none());
        self.by_type[PieceType::ALL.index()] ^= s;
        self.by_type[pc.piece_type().index()] ^= s;
        self.by_color[pc.color().index()] ^= s;
        self.squares[s.index()] = Piece::NONE;
        self.piece_count[pc.index()] -= 1;
        let last = self.piece_list[pc.index()][self.piece_count[pc.index()] as usize];
        self.index[last.index()] = self.index[s.index()];
        self.piece_list[pc.index()][self.index[last.index()] as usize] = last;
        self.piece_count[Piece::make(pc.color(), PieceType::ALL).index()] -= 1;
        self.psq -= psqt::psq(pc, s);
    }

    /// `index[from]` goes stale; it is only ever read for occupied squares.
    pub(crate) fn move_piece(&mut self, from: Square, to: Square) {
        let pc = self.squares[from.index()];
        debug_assert!(!pc.is_none() && self.empty(to));
        let from_to = from | to;
        self.by_type[PieceType::ALL.index()] ^= from_to;
        self.by_type[pc.piece_type().index()] ^= from_to;
        self.by_color[pc.color().index()] ^= from_to;
        self.squares[from.index()] = Piece::NONE;
        self.squares[to.index()] = pc;
        self.index[to.index()] = self.index[from.index()];
        self.piece_list[pc.index()][self.index[to.index()] as usize] = to;
        self.psq += psqt::psq(pc, to) - psqt::psq(pc, from);
    }

    /// Cross-checks every redundant shape against the square array.
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        let mut union = Bitboard::EMPTY;
        for pt in PieceType::EACH {
            let bb = self.pieces_p(pt);
            if (union & bb).any() { return Err("piece type bitboards overlap"); }
            union |= bb;
        }
        if union != self.pieces() { return Err("all-pieces bitboard is not the union of type bitboards"); }
        if (self.pieces_c(Color::White) & self.pieces_c(Color::Black)).any()
            || (self.pieces_c(Color::White) | self.pieces_c(Color::Black)) != self.pieces()
        {
            return Err("color bitboards disagree with occupancy");
        }
        let mut psq = Score::ZERO;
        for s in Square::all() {
            let pc = self.piece_on(s);
            if pc.is_none() {
                if self.pieces().contains(s) { return Err("occupied bit on an empty square"); }
                continue;
            }
            if !self.pieces_cp(pc.color(), pc.piece_type()).contains(s) {
                return Err("square array disagrees with bitboards");
            }
            let slot = self.index[s.index()] as usize;
            if slot >= self.count_piece(pc) || self.piece_list[pc.index()][slot] != s {
                return Err("piece list index is stale");
            }
            psq += psqt::psq(pc, s);
        }
        for c in Color::BOTH {
            let mut total = 0;
            for pt in PieceType::EACH {
                let n = self.count(c, pt);
                if n != self.pieces_cp(c, pt).popcount() as usize { return Err("piece count disagrees with bitboards"); }
                total += n;
            }
            if total != self.count_piece(Piece::make(c, PieceType::ALL)) { return Err("aggregate piece count is wrong"); }
        }
        if psq != self.psq { return Err("incremental psq score drifted"); }
        Ok(())
    }
}
