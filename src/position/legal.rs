use super::Position;
use crate::bitboard::*;
use crate::types::*;

impl<O> Position<O> {
    /// Whether `m` obeys the movement rules in this position, ignoring
    /// whether it leaves the own king attacked. Safe on arbitrary input such
    /// as stale hash-table moves.
    pub fn pseudo_legal(&self, m: Move) -> bool {
        use PieceType as Pt;
        if !m.is_ok() {
            return false;
        }
        if m.kind() != MoveKind::Promotion && (m.0 >> 12) & 3 != 0 {
            return false;
        }

        let us = self.side_to_move;
        let from = m.from();
        let to = m.to();
        let pc = self.piece_on(from);
        if pc.is_none() || pc.color() != us {
            return false;
        }

        if m.kind() == MoveKind::Castling {
            if pc.piece_type() != Pt::KING {
                return false;
            }
            let cr = CastlingRights::single(us, to > from);
            return self.can_castle(cr)
                && self.castling_rook_square(cr) == to
                && !self.castling_impeded(cr)
                && self.piece_on(to) == Piece::make(us, Pt::ROOK);
        }

        if self.pieces_c(us).contains(to) {
            return false;
        }

        match m.kind() {
            MoveKind::EnPassant => {
                pc.piece_type() == Pt::PAWN
                    && self.ep_square() == Some(to)
                    && pawn_attacks(us, from).contains(to)
            }
            MoveKind::Promotion => {
                pc.piece_type() == Pt::PAWN && to.relative_rank(us) == RANK_8 && self.pawn_step(us, from, to)
            }
            _ if pc.piece_type() == Pt::PAWN => to.relative_rank(us) != RANK_8 && self.pawn_step(us, from, to),
            _ => attacks_bb(pc.piece_type(), from, self.pieces()).contains(to),
        }
    }

    /// Pawn capture, single push or double push from `from` to `to`.
    fn pawn_step(&self, us: Color, from: Square, to: Square) -> bool {
        let push = pawn_push(us);
        let one = from.offset(push);
        (pawn_attacks(us, from) & self.pieces_c(!us)).contains(to)
            || (one == to && self.empty(to))
            || (from.relative_rank(us) == RANK_2 && one.offset(push) == to && self.empty(one) && self.empty(to))
    }

    /// Whether a pseudo-legal move leaves the own king safe. Exact in every
    /// position, in check or not.
    pub fn legal(&self, m: Move) -> bool {
        use PieceType as Pt;
        debug_assert!(m.is_ok());

        let us = self.side_to_move;
        let them = !us;
        let from = m.from();
        let to = m.to();
        let ksq = self.king_square(us);

        match m.kind() {
            MoveKind::EnPassant => {
                let capsq = to.offset(-pawn_push(us));
                let occupied = (self.pieces() ^ from ^ capsq) | to;
                return (self.attackers_to_occ(ksq, occupied) & self.pieces_c(them) & !Bitboard::from(capsq))
                    .is_empty();
            }
            MoveKind::Castling => {
                if self.in_check() {
                    return false;
                }
                let kto = (if to > from { Square::G1 } else { Square::C1 }).relative(us);
                let step = if kto > from { WEST } else { EAST };
                let mut s = kto;
                while s != from {
                    if (self.attackers_to(s) & self.pieces_c(them)).any() {
                        return false;
                    }
                    s = s.offset(step);
                }
                // The castling rook may be screening its own back rank.
                return (attacks_bb(Pt::ROOK, kto, self.pieces() ^ to) & self.pieces_cpp(them, Pt::ROOK, Pt::QUEEN))
                    .is_empty();
            }
            _ => {}
        }

        if self.piece_on(from).piece_type() == Pt::KING {
            return (self.attackers_to_occ(to, self.pieces() ^ from) & self.pieces_c(them)).is_empty();
        }

        let checkers = self.checkers();
        if checkers.any() {
            if checkers.more_than_one() {
                return false;
            }
            if !(between_bb(ksq, checkers.lsb()) | checkers).contains(to) {
                return false;
            }
        }

        !self.blockers_for_king(us).contains(from) || aligned(from, to, ksq)
    }

    /// Whether a pseudo-legal move checks the enemy king.
    pub fn gives_check(&self, m: Move) -> bool {
        use PieceType as Pt;
        debug_assert!(m.is_ok());

        let us = self.side_to_move;
        let from = m.from();
        let to = m.to();
        let ksq = self.king_square(!us);

        if m.kind() == MoveKind::Castling {
            let kto = (if to > from { Square::G1 } else { Square::C1 }).relative(us);
            let rto = (if to > from { Square::F1 } else { Square::D1 }).relative(us);
            let occupied = (self.pieces() ^ from ^ to) | kto | rto;
            let rooks = (self.pieces_cpp(us, Pt::ROOK, Pt::QUEEN) ^ to) | rto;
            return (attacks_bb(Pt::ROOK, ksq, occupied) & rooks).any()
                || (attacks_bb(Pt::BISHOP, ksq, occupied) & self.pieces_cpp(us, Pt::BISHOP, Pt::QUEEN)).any();
        }

        if self.check_squares(self.piece_on(from).piece_type()).contains(to) {
            return true;
        }

        if self.blockers_for_king(!us).contains(from) && !aligned(from, to, ksq) {
            return true;
        }

        match m.kind() {
            MoveKind::Promotion => attacks_bb(m.promotion_type(), to, self.pieces() ^ from).contains(ksq),
            MoveKind::EnPassant => {
                let capsq = Square::new(to.file(), from.rank());
                let b = (self.pieces() ^ from ^ capsq) | to;
                (attacks_bb(Pt::ROOK, ksq, b) & self.pieces_cpp(us, Pt::QUEEN, Pt::ROOK)).any()
                    || (attacks_bb(Pt::BISHOP, ksq, b) & self.pieces_cpp(us, Pt::QUEEN, Pt::BISHOP)).any()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pseudo_legal_rejects_garbage() {
        let pos = Position::new();
        assert!(!pos.pseudo_legal(Move::NONE));
        assert!(!pos.pseudo_legal(Move::NULL));
        assert!(!pos.pseudo_legal(Move::new(Square::E4, Square::E5)));
        assert!(!pos.pseudo_legal(Move::new(Square::E7, Square::E5)));
        assert!(!pos.pseudo_legal(Move::new(Square::E2, Square::E5)));
        assert!(!pos.pseudo_legal(Move::new(Square::A1, Square::A3)));
        assert!(!pos.pseudo_legal(Move::with_kind(Square::E1, Square::H1, MoveKind::Castling)));
        assert!(!pos.pseudo_legal(Move(Move::new(Square::E2, Square::E4).0 | 0x1000)));
        assert!(pos.pseudo_legal(Move::new(Square::E2, Square::E4)));
        assert!(pos.pseudo_legal(Move::new(Square::G1, Square::F3)));
    }

    #[test]
    fn pinned_piece_may_only_slide_along_pin() {
        let pos = Position::from_fen("4k3/4r3/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        assert!(pos.legal(Move::new(Square::E2, Square::E5)));
        assert!(pos.legal(Move::new(Square::E2, Square::E7)));
        assert!(!pos.legal(Move::new(Square::E2, Square::D2)));
    }

    #[test]
    fn evasions_must_block_or_capture() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/1B6/r3K3 w - - 0 1").unwrap();
        assert!(pos.in_check());
        assert!(!pos.legal(Move::new(Square::B2, Square::C3)));
        assert!(pos.legal(Move::new(Square::B2, Square::A1)));
        assert!(!pos.legal(Move::new(Square::E1, Square::D1)));
        assert!(pos.legal(Move::new(Square::E1, Square::E2)));
    }

    #[test]
    fn discovered_and_promotion_checks() {
        let pos = Position::from_fen("4k3/1P6/8/8/8/8/4B3/4RK2 w - - 0 1").unwrap();
        assert!(pos.gives_check(Move::new(Square::E2, Square::B5)));
        assert!(pos.gives_check(Move::promotion(Square::B7, Square::B8, PieceType::QUEEN)));
        assert!(pos.gives_check(Move::promotion(Square::B7, Square::B8, PieceType::ROOK)));
        assert!(!pos.gives_check(Move::promotion(Square::B7, Square::B8, PieceType::KNIGHT)));
    }
}
