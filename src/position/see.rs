use super::Position;
use crate::bitboard::*;
use crate::types::*;

impl<O> Position<O> {
    /// Static exchange test: does `m` win at least `threshold` once both
    /// sides have traded off on the destination square with their least
    /// valuable attackers?
    pub fn see_ge(&self, m: Move, threshold: Value) -> bool {
        debug_assert!(m.is_ok());
        if m.kind() == MoveKind::Castling {
            return VALUE_ZERO >= threshold;
        }

        let to = m.to();
        let (gain, at_risk, mut occupied) = self.exchange_start(m);

        let mut swap = gain - threshold;
        if swap < 0 {
            return false;
        }
        swap = at_risk - swap;
        if swap <= 0 {
            return true;
        }

        let mut stm = self.piece_on(m.from()).color();
        let mut attackers = self.attackers_to_occ(to, occupied);
        let mut res = 1;

        loop {
            stm = !stm;
            attackers &= occupied;

            let Some(stm_attackers) = self.exchange_attackers(attackers, occupied, stm) else { break };
            res ^= 1;

            let (pt, bb) = self.least_valuable(stm_attackers);
            if pt == PieceType::KING {
                // A king may only take last.
                return (if (attackers & !self.pieces_c(stm)).any() { res ^ 1 } else { res }) != 0;
            }

            swap = piece_value_mg(pt) - swap;
            if swap < res {
                break;
            }
            occupied ^= bb.lsb_bb();
            attackers |= self.xray_attackers(pt, to, occupied);
        }
        res != 0
    }

    /// Exact value of the exchange started by `m`, from the mover's point of
    /// view, with either side free to stop capturing. Agrees with `see_ge`:
    /// `see(m) >= t` exactly when `see_ge(m, t)`.
    pub fn see(&self, m: Move) -> Value {
        debug_assert!(m.is_ok());
        if m.kind() == MoveKind::Castling {
            return VALUE_ZERO;
        }

        let to = m.to();
        let (gain, at_risk, mut occupied) = self.exchange_start(m);
        if at_risk == VALUE_ZERO {
            // A legally moving king is never recaptured.
            return gain;
        }
        let mut gains = [VALUE_ZERO; 40];
        gains[0] = gain;
        let mut depth = 0;
        let mut on_square = at_risk;

        let mut stm = self.piece_on(m.from()).color();
        let mut attackers = self.attackers_to_occ(to, occupied);

        loop {
            stm = !stm;
            attackers &= occupied;

            let Some(stm_attackers) = self.exchange_attackers(attackers, occupied, stm) else { break };
            let (pt, bb) = self.least_valuable(stm_attackers);
            if pt == PieceType::KING && (attackers & !self.pieces_c(stm)).any() {
                break;
            }

            depth += 1;
            gains[depth] = on_square - gains[depth - 1];
            on_square = piece_value_mg(pt);

            occupied ^= bb.lsb_bb();
            attackers |= self.xray_attackers(pt, to, occupied);
        }

        while depth > 0 {
            gains[depth - 1] = -(-gains[depth - 1]).max(gains[depth]);
            depth -= 1;
        }
        gains[0]
    }

    /// Material won by the move itself, value of the piece it puts on the
    /// square, and the occupancy right after it.
    fn exchange_start(&self, m: Move) -> (Value, Value, Bitboard) {
        let from = m.from();
        let to = m.to();
        let mut occupied = (self.pieces() ^ from) & !Bitboard::from(to);

        let (mut gain, mut at_risk) = (
            piece_value_mg(self.piece_on(to).piece_type()),
            piece_value_mg(self.piece_on(from).piece_type()),
        );
        match m.kind() {
            MoveKind::EnPassant => {
                gain = PAWN_VALUE_MG;
                occupied ^= to.offset(-pawn_push(self.side_to_move));
            }
            MoveKind::Promotion => {
                gain += piece_value_mg(m.promotion_type()) - PAWN_VALUE_MG;
                at_risk = piece_value_mg(m.promotion_type());
            }
            _ => {}
        }
        (gain, at_risk, occupied)
    }

    /// `stm`'s attackers that may take part, with pinned pieces held back
    /// while their pinner is still on the board.
    fn exchange_attackers(&self, attackers: Bitboard, occupied: Bitboard, stm: Color) -> Option<Bitboard> {
        let mut stm_attackers = attackers & self.pieces_c(stm);
        if (self.pinners(!stm) & occupied).any() {
            stm_attackers &= !self.blockers_for_king(stm);
        }
        stm_attackers.any().then_some(stm_attackers)
    }

    fn least_valuable(&self, stm_attackers: Bitboard) -> (PieceType, Bitboard) {
        for pt in PieceType::EACH {
            let bb = stm_attackers & self.pieces_p(pt);
            if bb.any() {
                return (pt, bb);
            }
        }
        (PieceType::KING, stm_attackers)
    }

    /// Sliders uncovered behind a piece of type `pt` that just captured on `to`.
    fn xray_attackers(&self, pt: PieceType, to: Square, occupied: Bitboard) -> Bitboard {
        use PieceType as Pt;
        let diagonal = || attacks_bb(Pt::BISHOP, to, occupied) & self.pieces_pp(Pt::BISHOP, Pt::QUEEN);
        let straight = || attacks_bb(Pt::ROOK, to, occupied) & self.pieces_pp(Pt::ROOK, Pt::QUEEN);
        match pt {
            Pt::PAWN | Pt::BISHOP => diagonal(),
            Pt::ROOK => straight(),
            Pt::QUEEN => diagonal() | straight(),
            _ => Bitboard::EMPTY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_takes_pawn_defended_by_king_loses() {
        let pos = Position::from_fen("6k1/2R4p/6p1/8/6K1/6P1/8/8 w - - 3 38").unwrap();
        let m = Move::new(Square::C7, Square::H7);
        assert_eq!(pos.see(m), PAWN_VALUE_MG - ROOK_VALUE_MG);
        assert!(!pos.see_ge(m, 0));
        assert!(pos.see_ge(m, PAWN_VALUE_MG - ROOK_VALUE_MG));
    }

    #[test]
    fn xray_behind_rook_counts() {
        // Rxd5 backed by the queen on d1; the pawn is defended once.
        let pos = Position::from_fen("3r2k1/8/8/3p4/8/8/3R4/3QK3 w - - 0 1").unwrap();
        let m = Move::new(Square::D2, Square::D5);
        assert_eq!(pos.see(m), PAWN_VALUE_MG - ROOK_VALUE_MG + ROOK_VALUE_MG);
        assert!(pos.see_ge(m, PAWN_VALUE_MG));
        assert!(!pos.see_ge(m, PAWN_VALUE_MG + 1));
    }

    #[test]
    fn castling_is_neutral() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let m = Move::with_kind(Square::E1, Square::H1, MoveKind::Castling);
        assert_eq!(pos.see(m), 0);
        assert!(pos.see_ge(m, 0));
        assert!(!pos.see_ge(m, 1));
    }
}
