//! The mutable chess position: piece placement, castling metadata and a
//! depth-indexed stack of per-ply states. Moves are applied with `do_move`
//! and taken back with `undo_move`; everything else is a query.

mod legal;
mod make;
pub mod packed;
mod see;
pub mod setup;
pub mod state;

use crate::bitboard::*;
use crate::board::Board;
use crate::eval::PieceObserver;
use crate::types::*;
use crate::zobrist::{self, Key};

pub use packed::PackedPosition;
pub use setup::Setup;
pub use state::{DirtyPiece, StateInfo, StateStack};

/// A chess position. `O` receives the dirty-piece delta of every move; the
/// default `()` observer does nothing.
#[derive(Clone)]
pub struct Position<O = ()> {
    board: Board,
    castling_rights_mask: [CastlingRights; 64],
    castling_rook_square: [Square; CastlingRights::NB],
    castling_path: [Bitboard; CastlingRights::NB],
    game_ply: i32,
    side_to_move: Color,
    chess960: bool,
    states: StateStack,
    observer: O,
}

impl Default for Position {
    fn default() -> Self { Self::new() }
}

impl Position {
    /// The standard starting position.
    pub fn new() -> Self { Self::with_observer(()) }

    pub fn startpos() -> Self { Self::new() }
}

impl<O: PieceObserver> Position<O> {
    /// Starting position with `observer` attached.
    pub fn with_observer(observer: O) -> Self {
        let mut pos = Position {
            board: Board::new(),
            castling_rights_mask: [CastlingRights::NONE; 64],
            castling_rook_square: [Square::A1; CastlingRights::NB],
            castling_path: [Bitboard::EMPTY; CastlingRights::NB],
            game_ply: 0,
            side_to_move: Color::White,
            chess960: false,
            states: StateStack::new(),
            observer,
        };
        pos.load(&Setup::startpos(), false);
        pos
    }

    pub fn observer_mut(&mut self) -> &mut O { &mut self.observer }

    /// Places the pieces and derives all state from a setup that already
    /// passed structural validation.
    pub(crate) fn load(&mut self, setup: &Setup, chess960: bool) {
        self.board.clear();
        self.castling_rights_mask = [CastlingRights::NONE; 64];
        self.castling_rook_square = [Square::A1; CastlingRights::NB];
        self.castling_path = [Bitboard::EMPTY; CastlingRights::NB];
        self.states.reset();

        for s in Square::all() {
            let pc = setup.board[s.index()];
            if !pc.is_none() {
                self.board.put_piece(pc, s);
            }
        }
        self.side_to_move = setup.side_to_move;
        self.chess960 = chess960;

        for &rsq in &setup.castling {
            let c = self.board.piece_on(rsq).color();
            self.set_castling_right(c, rsq);
        }

        if let Some(ep) = setup.ep_square {
            if self.ep_capture_possible(ep, self.side_to_move) {
                self.st_mut().ep_square = Some(ep);
            } else {
                log::debug!("dropping en-passant square {}: no legal capture", ep);
            }
        }

        self.st_mut().rule50 = setup.rule50.min(i32::MAX as u32) as i32;
        let fullmove = setup.fullmove.max(1).min(i32::MAX as u32 / 2) as i32;
        self.game_ply = 2 * (fullmove - 1) + (self.side_to_move == Color::Black) as i32;

        self.set_state();
        self.observer.reset(&self.board);
    }
}

impl<O> Position<O> {
    #[inline]
    pub(crate) fn st(&self) -> &StateInfo { self.states.top() }

    #[inline]
    pub(crate) fn st_mut(&mut self) -> &mut StateInfo { self.states.top_mut() }

    pub fn observer(&self) -> &O { &self.observer }

    pub fn board(&self) -> &Board { &self.board }

    /// Current state record (dirty piece, keys, check info).
    pub fn state(&self) -> &StateInfo { self.st() }

    pub fn states(&self) -> &StateStack { &self.states }

    // Piece placement

    #[inline]
    pub fn side_to_move(&self) -> Color { self.side_to_move }

    #[inline]
    pub fn piece_on(&self, s: Square) -> Piece { self.board.piece_on(s) }

    #[inline]
    pub fn empty(&self, s: Square) -> bool { self.board.empty(s) }

    #[inline]
    pub fn pieces(&self) -> Bitboard { self.board.pieces() }

    #[inline]
    pub fn pieces_p(&self, pt: PieceType) -> Bitboard { self.board.pieces_p(pt) }

    #[inline]
    pub fn pieces_pp(&self, pt1: PieceType, pt2: PieceType) -> Bitboard { self.board.pieces_pp(pt1, pt2) }

    #[inline]
    pub fn pieces_c(&self, c: Color) -> Bitboard { self.board.pieces_c(c) }

    #[inline]
    pub fn pieces_cp(&self, c: Color, pt: PieceType) -> Bitboard { self.board.pieces_cp(c, pt) }

    #[inline]
    pub fn pieces_cpp(&self, c: Color, pt1: PieceType, pt2: PieceType) -> Bitboard {
        self.board.pieces_cpp(c, pt1, pt2)
    }

    #[inline]
    pub fn count(&self, c: Color, pt: PieceType) -> usize { self.board.count(c, pt) }

    #[inline]
    pub fn squares(&self, c: Color, pt: PieceType) -> &[Square] { self.board.squares(c, pt) }

    #[inline]
    pub fn square(&self, c: Color, pt: PieceType) -> Square { self.board.square(c, pt) }

    #[inline]
    pub fn king_square(&self, c: Color) -> Square { self.board.king_square(c) }

    #[inline]
    pub fn ep_square(&self) -> Option<Square> { self.st().ep_square }

    #[inline]
    pub fn is_on_semiopen_file(&self, c: Color, s: Square) -> bool {
        (self.pieces_cp(c, PieceType::PAWN) & file_bb(s.file())).is_empty()
    }

    // Castling

    #[inline]
    pub fn castling_rights(&self, c: Color) -> CastlingRights { self.st().castling_rights & CastlingRights::of(c) }

    #[inline]
    pub fn can_castle(&self, cr: CastlingRights) -> bool { self.st().castling_rights.intersects(cr) }

    /// Something stands between king and rook or on their destinations.
    #[inline]
    pub fn castling_impeded(&self, cr: CastlingRights) -> bool {
        debug_assert!(cr.index().count_ones() == 1);
        (self.pieces() & self.castling_path[cr.index()]).any()
    }

    #[inline]
    pub fn castling_rook_square(&self, cr: CastlingRights) -> Square { self.castling_rook_square[cr.index()] }

    // Checking

    #[inline]
    pub fn checkers(&self) -> Bitboard { self.st().checkers }

    #[inline]
    pub fn in_check(&self) -> bool { self.st().checkers.any() }

    #[inline]
    pub fn blockers_for_king(&self, c: Color) -> Bitboard { self.st().blockers_for_king[c.index()] }

    /// `c`'s sliders pinning an enemy piece to the enemy king.
    #[inline]
    pub fn pinners(&self, c: Color) -> Bitboard { self.st().pinners[c.index()] }

    /// Squares from which a piece of type `pt` of the side to move would check the enemy king.
    #[inline]
    pub fn check_squares(&self, pt: PieceType) -> Bitboard { self.st().check_squares[pt.index()] }

    /// Moving `m`'s piece may uncover an attack on `c`'s king.
    #[inline]
    pub fn is_discovery_check_on_king(&self, c: Color, m: Move) -> bool {
        self.st().blockers_for_king[c.index()].contains(m.from())
    }

    // Attacks

    #[inline]
    pub fn attackers_to(&self, s: Square) -> Bitboard { self.attackers_to_occ(s, self.pieces()) }

    /// Pieces of both colors attacking `s` if the board occupancy were `occupied`.
    pub fn attackers_to_occ(&self, s: Square, occupied: Bitboard) -> Bitboard {
        use PieceType as Pt;
        (pawn_attacks(Color::Black, s) & self.pieces_cp(Color::White, Pt::PAWN))
            | (pawn_attacks(Color::White, s) & self.pieces_cp(Color::Black, Pt::PAWN))
            | (pseudo_attacks(Pt::KNIGHT, s) & self.pieces_p(Pt::KNIGHT))
            | (attacks_bb(Pt::ROOK, s, occupied) & self.pieces_pp(Pt::ROOK, Pt::QUEEN))
            | (attacks_bb(Pt::BISHOP, s, occupied) & self.pieces_pp(Pt::BISHOP, Pt::QUEEN))
            | (pseudo_attacks(Pt::KING, s) & self.pieces_p(Pt::KING))
    }

    /// Pieces standing alone between `s` and one of `sliders`, and the
    /// sliders that pin a piece of the color standing on `s`.
    pub fn slider_blockers(&self, sliders: Bitboard, s: Square) -> (Bitboard, Bitboard) {
        use PieceType as Pt;
        let mut blockers = Bitboard::EMPTY;
        let mut pinners = Bitboard::EMPTY;
        let snipers = ((pseudo_attacks(Pt::ROOK, s) & self.pieces_pp(Pt::QUEEN, Pt::ROOK))
            | (pseudo_attacks(Pt::BISHOP, s) & self.pieces_pp(Pt::QUEEN, Pt::BISHOP)))
            & sliders;
        let occupancy = self.pieces() ^ snipers;
        let own = self.pieces_c(self.piece_on(s).color());

        for sniper in snipers {
            let b = between_bb(s, sniper) & occupancy;
            if b.any() && !b.more_than_one() {
                blockers |= b;
                if (b & own).any() {
                    pinners |= sniper;
                }
            }
        }
        (blockers, pinners)
    }

    // Move properties

    #[inline]
    pub fn moved_piece(&self, m: Move) -> Piece { self.piece_on(m.from()) }

    #[inline]
    pub fn capture(&self, m: Move) -> bool {
        debug_assert!(m.is_ok());
        (!self.empty(m.to()) && m.kind() != MoveKind::Castling) || m.kind() == MoveKind::EnPassant
    }

    #[inline]
    pub fn capture_or_promotion(&self, m: Move) -> bool {
        match m.kind() {
            MoveKind::Normal => !self.empty(m.to()),
            MoveKind::Castling => false,
            _ => true,
        }
    }

    #[inline]
    pub fn captured_piece(&self) -> Piece { self.st().captured_piece }

    /// Pawn push to the sixth rank or beyond.
    #[inline]
    pub fn advanced_pawn_push(&self, m: Move) -> bool {
        let pc = self.moved_piece(m);
        pc.piece_type() == PieceType::PAWN && m.from().relative_rank(pc.color()) > RANK_5
    }

    #[inline]
    pub fn pawn_passed(&self, c: Color, s: Square) -> bool {
        (self.pieces_cp(!c, PieceType::PAWN) & passed_pawn_span(c, s)).is_empty()
    }

    #[inline]
    pub fn pawns_on_same_color_squares(&self, c: Color, s: Square) -> usize {
        let squares = if DARK_SQUARES.contains(s) { DARK_SQUARES } else { !DARK_SQUARES };
        (self.pieces_cp(c, PieceType::PAWN) & squares).popcount() as usize
    }

    pub fn opposite_bishops(&self) -> bool {
        self.count(Color::White, PieceType::BISHOP) == 1
            && self.count(Color::Black, PieceType::BISHOP) == 1
            && opposite_colors(
                self.square(Color::White, PieceType::BISHOP),
                self.square(Color::Black, PieceType::BISHOP),
            )
    }

    // Keys and accumulators

    #[inline]
    pub fn key(&self) -> Key { self.st().key }

    #[inline]
    pub fn pawn_key(&self) -> Key { self.st().pawn_key }

    #[inline]
    pub fn material_key(&self) -> Key { self.st().material_key }

    #[inline]
    pub fn non_pawn_material(&self, c: Color) -> Value { self.st().non_pawn_material[c.index()] }

    #[inline]
    pub fn non_pawn_material_total(&self) -> Value {
        self.non_pawn_material(Color::White) + self.non_pawn_material(Color::Black)
    }

    #[inline]
    pub fn psq_score(&self) -> Score { self.board.psq() }

    #[inline]
    pub fn game_ply(&self) -> i32 { self.game_ply }

    #[inline]
    pub fn rule50_count(&self) -> i32 { self.st().rule50 }

    #[inline]
    pub fn is_chess960(&self) -> bool { self.chess960 }

    /// Full key recomputed from the board, ignoring the incremental value.
    pub fn compute_key(&self) -> Key {
        zobrist::compute(&self.board, self.side_to_move, self.st().castling_rights, self.st().ep_square)
    }

    fn compute_non_pawn_material(&self, c: Color) -> Value {
        [PieceType::KNIGHT, PieceType::BISHOP, PieceType::ROOK, PieceType::QUEEN]
            .into_iter()
            .map(|pt| self.count(c, pt) as Value * piece_value_mg(pt))
            .sum()
    }

    // Draws

    /// Fifty-move rule (unless the side to move is mated) or a repetition
    /// strictly inside the search horizon `ply`.
    pub fn is_draw(&self, ply: i32) -> bool {
        if self.st().rule50 > 99 && (!self.in_check() || crate::movegen::has_legal_move(self)) {
            return true;
        }
        self.st().repetition != 0 && self.st().repetition < ply
    }

    /// Any position since the last null move repeated an earlier one.
    pub fn has_repeated(&self) -> bool {
        let mut end = self.st().rule50.min(self.st().plies_from_null);
        let mut back = 0usize;
        while end >= 4 {
            if self.states.back(back).repetition != 0 {
                return true;
            }
            end -= 1;
            back += 1;
        }
        false
    }

    /// A reversible move from here reaches a position seen before, within
    /// the reversible window. Repetitions before the search root (`ply`)
    /// only count when that earlier position already repeated.
    pub fn has_game_cycle(&self, ply: i32) -> bool {
        let st = self.st();
        let end = st.rule50.min(st.plies_from_null);
        if end < 3 {
            return false;
        }
        let original = st.key;
        let mut i = 3;
        while i <= end {
            let stp = self.states.back(i as usize);
            if let Some(m) = zobrist::cuckoo_move(original ^ stp.key) {
                let (s1, s2) = (m.from(), m.to());
                if (zobrist::cuckoo_path(m) & self.pieces()).is_empty() {
                    if ply > i {
                        return true;
                    }
                    let s = if self.empty(s1) { s2 } else { s1 };
                    if self.piece_on(s).color() == self.side_to_move && stp.repetition != 0 {
                        return true;
                    }
                }
            }
            i += 2;
        }
        false
    }

    // Setup helpers

    fn set_castling_right(&mut self, c: Color, rfrom: Square) {
        let kfrom = self.king_square(c);
        let cr = CastlingRights::single(c, kfrom < rfrom);

        self.st_mut().castling_rights |= cr;
        self.castling_rights_mask[kfrom.index()] |= cr;
        self.castling_rights_mask[rfrom.index()] |= cr;
        self.castling_rook_square[cr.index()] = rfrom;

        let kto = (if cr.is_king_side() { Square::G1 } else { Square::C1 }).relative(c);
        let rto = (if cr.is_king_side() { Square::F1 } else { Square::D1 }).relative(c);
        self.castling_path[cr.index()] =
            (between_bb(rfrom, rto) | between_bb(kfrom, kto) | rto | kto) & !(kfrom | rfrom);
    }

    /// True if a pawn of `us` could legally capture en passant on `ep`.
    pub(crate) fn ep_capture_possible(&self, ep: Square, us: Color) -> bool {
        let them = !us;
        let capsq = ep.offset(pawn_push(them));
        if ep.relative_rank(us) != RANK_6
            || self.piece_on(capsq) != Piece::make(them, PieceType::PAWN)
            || !self.empty(ep)
            || !self.empty(ep.offset(-pawn_push(them)))
        {
            return false;
        }
        let ksq = self.king_square(us);
        for from in pawn_attacks(them, ep) & self.pieces_cp(us, PieceType::PAWN) {
            let occupied = (self.pieces() ^ from ^ capsq) | ep;
            if (self.attackers_to_occ(ksq, occupied) & self.pieces_c(them) & !Bitboard::from(capsq)).is_empty() {
                return true;
            }
        }
        false
    }

    /// Derives keys, material and checkers from the board. Used by `set()`.
    fn set_state(&mut self) {
        let key = self.compute_key();
        let pawn_key = zobrist::compute_pawn_key(&self.board);
        let material_key = zobrist::compute_material_key(&self.board);
        let npm = [self.compute_non_pawn_material(Color::White), self.compute_non_pawn_material(Color::Black)];
        let us = self.side_to_move;
        let checkers = self.attackers_to(self.king_square(us)) & self.pieces_c(!us);

        let st = self.st_mut();
        st.key = key;
        st.pawn_key = pawn_key;
        st.material_key = material_key;
        st.non_pawn_material = npm;
        st.checkers = checkers;
        self.set_check_info();
    }

    /// Blockers, pinners and check squares for the current side to move.
    pub(crate) fn set_check_info(&mut self) {
        use PieceType as Pt;
        let (wb, bp) = self.slider_blockers(self.pieces_c(Color::Black), self.king_square(Color::White));
        let (bb, wp) = self.slider_blockers(self.pieces_c(Color::White), self.king_square(Color::Black));

        let ksq = self.king_square(!self.side_to_move);
        let occ = self.pieces();
        let mut cs = [Bitboard::EMPTY; PieceType::NB];
        cs[Pt::PAWN.index()] = pawn_attacks(!self.side_to_move, ksq);
        cs[Pt::KNIGHT.index()] = pseudo_attacks(Pt::KNIGHT, ksq);
        cs[Pt::BISHOP.index()] = attacks_bb(Pt::BISHOP, ksq, occ);
        cs[Pt::ROOK.index()] = attacks_bb(Pt::ROOK, ksq, occ);
        cs[Pt::QUEEN.index()] = cs[Pt::BISHOP.index()] | cs[Pt::ROOK.index()];

        let st = self.st_mut();
        st.blockers_for_king = [wb, bb];
        st.pinners = [wp, bp];
        st.check_squares = cs;
    }

    /// Ply distance to the last occurrence of the current key inside the
    /// reversible window, negated when that occurrence was itself a repeat.
    pub(crate) fn update_repetition(&mut self) {
        let st = self.st();
        let end = st.rule50.min(st.plies_from_null);
        let mut repetition = 0;
        let mut i = 4;
        while i <= end {
            let stp = self.states.back(i as usize);
            if stp.key == st.key {
                repetition = if stp.repetition != 0 { -i } else { i };
                break;
            }
            i += 2;
        }
        self.st_mut().repetition = repetition;
    }

    // Consistency

    /// Full consistency check, logging the first failure. Expensive; meant
    /// for `debug_assert!` and tests.
    pub fn pos_is_ok(&self) -> bool {
        match self.consistency() {
            Ok(()) => true,
            Err(why) => {
                log::error!("inconsistent position ({}): {}", why, self.fen());
                false
            }
        }
    }

    fn consistency(&self) -> Result<(), &'static str> {
        use PieceType as Pt;
        self.board.check_invariants()?;

        for c in Color::BOTH {
            if self.count(c, Pt::KING) != 1 {
                return Err("king count");
            }
            if self.count(c, Pt::PAWN) > 8 || self.board.count_piece(Piece::make(c, Pt::ALL)) > 16 {
                return Err("too many pieces");
            }
        }
        if (self.pieces_p(Pt::PAWN) & (RANK_1_BB | RANK_8_BB)).any() {
            return Err("pawn on a back rank");
        }
        let us = self.side_to_move;
        if (self.attackers_to(self.king_square(!us)) & self.pieces_c(us)).any() {
            return Err("side not to move is in check");
        }
        if let Some(ep) = self.ep_square() {
            if ep.relative_rank(us) != RANK_6 {
                return Err("en-passant square on the wrong rank");
            }
        }

        let st = self.st();
        if st.key != self.compute_key() {
            return Err("position key");
        }
        if st.pawn_key != zobrist::compute_pawn_key(&self.board) {
            return Err("pawn key");
        }
        if st.material_key != zobrist::compute_material_key(&self.board) {
            return Err("material key");
        }
        for c in Color::BOTH {
            if st.non_pawn_material[c.index()] != self.compute_non_pawn_material(c) {
                return Err("non-pawn material");
            }
        }
        if st.checkers != self.attackers_to(self.king_square(us)) & self.pieces_c(!us) {
            return Err("checkers");
        }
        if st.checkers.popcount() > 2 {
            return Err("more than two checkers");
        }

        for cr in CastlingRights::EACH {
            if !self.can_castle(cr) {
                continue;
            }
            let c = cr.color();
            let rsq = self.castling_rook_square(cr);
            if self.piece_on(rsq) != Piece::make(c, Pt::ROOK)
                || self.castling_rights_mask[rsq.index()] != cr
                || !self.castling_rights_mask[self.king_square(c).index()].intersects(cr)
            {
                return Err("castling metadata");
            }
        }
        Ok(())
    }
}
