use super::{DirtyPiece, Position, Setup};
use crate::bitboard::Bitboard;
use crate::eval::PieceObserver;
use crate::types::*;
use crate::zobrist::{self, Key};

impl<O: PieceObserver> Position<O> {
    /// Applies a legal move.
    pub fn do_move(&mut self, m: Move) {
        let gives_check = self.gives_check(m);
        self.do_move_with(m, gives_check);
    }

    /// Applies a legal move; `gives_check` must equal `self.gives_check(m)`.
    pub fn do_move_with(&mut self, m: Move, gives_check: bool) {
        use PieceType as Pt;
        debug_assert!(m.is_ok());

        let mut k: Key = self.st().key ^ zobrist::side();

        self.states.push_forward();
        self.game_ply += 1;
        self.st_mut().rule50 += 1;
        self.st_mut().plies_from_null += 1;

        let us = self.side_to_move;
        let them = !us;
        let from = m.from();
        let mut to = m.to();
        let pc = self.piece_on(from);
        let mut captured =
            if m.kind() == MoveKind::EnPassant { Piece::make(them, Pt::PAWN) } else { self.piece_on(to) };
        let mut dirty = DirtyPiece::default();

        debug_assert!(pc.color() == us);
        debug_assert!(captured.is_none() || captured.color() == if m.kind() != MoveKind::Castling { them } else { us });
        debug_assert!(captured.piece_type() != Pt::KING);

        if m.kind() == MoveKind::Castling {
            debug_assert!(pc == Piece::make(us, Pt::KING));
            debug_assert!(captured == Piece::make(us, Pt::ROOK));

            let (kto, rfrom, rto) = self.do_castling::<true>(us, from, to);
            dirty.push(pc, Some(from), Some(kto));
            dirty.push(captured, Some(rfrom), Some(rto));
            k ^= zobrist::psq(captured, rfrom) ^ zobrist::psq(captured, rto);
            to = kto;
            captured = Piece::NONE;
        }

        if !captured.is_none() {
            let mut capsq = to;
            if captured.piece_type() == Pt::PAWN {
                if m.kind() == MoveKind::EnPassant {
                    capsq = to.offset(-pawn_push(us));
                    debug_assert!(pc == Piece::make(us, Pt::PAWN));
                    debug_assert!(to.relative_rank(us) == RANK_6);
                    debug_assert!(self.empty(to));
                    debug_assert!(self.piece_on(capsq) == Piece::make(them, Pt::PAWN));
                }
                self.st_mut().pawn_key ^= zobrist::psq(captured, capsq);
            } else {
                self.st_mut().non_pawn_material[them.index()] -= piece_value_mg(captured.piece_type());
            }

            dirty.push(captured, Some(capsq), None);
            self.board.remove_piece(capsq);

            k ^= zobrist::psq(captured, capsq);
            let mk = zobrist::material(captured, self.board.count_piece(captured));
            let st = self.st_mut();
            st.material_key ^= mk;
            st.rule50 = 0;
        }

        k ^= zobrist::psq(pc, from) ^ zobrist::psq(pc, to);

        if let Some(ep) = self.st().ep_square {
            k ^= zobrist::enpassant(ep.file());
            self.st_mut().ep_square = None;
        }

        let cr_mask = self.castling_rights_mask[from.index()] | self.castling_rights_mask[to.index()];
        let rights = self.st().castling_rights;
        if !rights.is_empty() && !cr_mask.is_empty() {
            let remaining = rights & !cr_mask;
            k ^= zobrist::castling(rights) ^ zobrist::castling(remaining);
            self.st_mut().castling_rights = remaining;
        }

        if m.kind() != MoveKind::Castling {
            dirty.push(pc, Some(from), Some(to));
            self.board.move_piece(from, to);
        }

        if pc.piece_type() == Pt::PAWN {
            if to.0 ^ from.0 == 16 {
                let ep = to.offset(-pawn_push(us));
                if self.ep_capture_possible(ep, them) {
                    self.st_mut().ep_square = Some(ep);
                    k ^= zobrist::enpassant(ep.file());
                }
            } else if m.kind() == MoveKind::Promotion {
                let promotion = Piece::make(us, m.promotion_type());
                debug_assert!(to.relative_rank(us) == RANK_8);

                self.board.remove_piece(to);
                self.board.put_piece(promotion, to);

                let last = dirty.len() - 1;
                dirty.set_to(last, None);
                dirty.push(promotion, None, Some(to));

                k ^= zobrist::psq(pc, to) ^ zobrist::psq(promotion, to);
                let mk = zobrist::material(promotion, self.board.count_piece(promotion) - 1)
                    ^ zobrist::material(pc, self.board.count_piece(pc));
                let st = self.st_mut();
                st.pawn_key ^= zobrist::psq(pc, to);
                st.material_key ^= mk;
                st.non_pawn_material[us.index()] += piece_value_mg(promotion.piece_type());
            }

            let st = self.st_mut();
            st.pawn_key ^= zobrist::psq(pc, from) ^ zobrist::psq(pc, to);
            st.rule50 = 0;
        }

        let checkers = if gives_check {
            self.attackers_to(self.king_square(them)) & self.pieces_c(us)
        } else {
            Bitboard::EMPTY
        };

        let st = self.st_mut();
        st.captured_piece = captured;
        st.key = k;
        st.checkers = checkers;
        st.dirty_piece = dirty;

        self.side_to_move = them;
        self.set_check_info();
        self.update_repetition();
        self.observer.push(&dirty, &self.board);

        debug_assert!(self.pos_is_ok());
    }

    /// Takes back `m`, which must be the last move applied.
    pub fn undo_move(&mut self, m: Move) {
        use PieceType as Pt;
        debug_assert!(m.is_ok());

        self.side_to_move = !self.side_to_move;
        let us = self.side_to_move;
        let from = m.from();
        let to = m.to();

        if m.kind() == MoveKind::Promotion {
            debug_assert!(to.relative_rank(us) == RANK_8);
            debug_assert!(self.piece_on(to).piece_type() == m.promotion_type());
            self.board.remove_piece(to);
            self.board.put_piece(Piece::make(us, Pt::PAWN), to);
        }

        if m.kind() == MoveKind::Castling {
            self.do_castling::<false>(us, from, to);
        } else {
            self.board.move_piece(to, from);
            let captured = self.st().captured_piece;
            if !captured.is_none() {
                let capsq = if m.kind() == MoveKind::EnPassant { to.offset(-pawn_push(us)) } else { to };
                self.board.put_piece(captured, capsq);
            }
        }

        self.states.pop();
        self.game_ply -= 1;
        self.observer.pop();

        debug_assert!(self.pos_is_ok());
    }

    /// Moves king and rook for castling (`DO`) or back. Returns the king's
    /// destination and the rook's origin and destination.
    fn do_castling<const DO: bool>(&mut self, us: Color, from: Square, to: Square) -> (Square, Square, Square) {
        let king_side = to > from;
        let rfrom = to;
        let rto = (if king_side { Square::F1 } else { Square::D1 }).relative(us);
        let kto = (if king_side { Square::G1 } else { Square::C1 }).relative(us);

        // Remove both first: in Chess960 the destinations may overlap the origins.
        self.board.remove_piece(if DO { from } else { kto });
        self.board.remove_piece(if DO { rfrom } else { rto });
        self.board.put_piece(Piece::make(us, PieceType::KING), if DO { kto } else { from });
        self.board.put_piece(Piece::make(us, PieceType::ROOK), if DO { rto } else { rfrom });
        (kto, rfrom, rto)
    }

    /// Passes the turn. Not allowed while in check.
    pub fn do_null_move(&mut self) {
        debug_assert!(!self.in_check());

        self.states.push_copy();
        if let Some(ep) = self.st().ep_square {
            let st = self.st_mut();
            st.key ^= zobrist::enpassant(ep.file());
            st.ep_square = None;
        }

        let st = self.st_mut();
        st.key ^= zobrist::side();
        st.rule50 += 1;
        st.plies_from_null = 0;
        st.captured_piece = Piece::NONE;
        st.dirty_piece = DirtyPiece::default();

        self.side_to_move = !self.side_to_move;
        self.set_check_info();
        self.st_mut().repetition = 0;
        self.observer.push(&DirtyPiece::default(), &self.board);

        debug_assert!(self.pos_is_ok());
    }

    pub fn undo_null_move(&mut self) {
        debug_assert!(!self.in_check());
        self.states.pop();
        self.side_to_move = !self.side_to_move;
        self.observer.pop();
    }

    /// Mirrors the position top to bottom and swaps the colors. Move history
    /// is discarded.
    pub fn flip(&mut self) {
        let flipped = self.to_setup().flipped();
        let chess960 = self.chess960;
        self.load(&flipped, chess960);
        debug_assert!(self.pos_is_ok());
    }
}

impl<O> Position<O> {
    /// Key after a normal move, ignoring castling rights, en passant and
    /// promotions. Meant for prefetching.
    pub fn key_after(&self, m: Move) -> Key {
        let from = m.from();
        let to = m.to();
        let pc = self.piece_on(from);
        let captured = self.piece_on(to);
        let mut k = self.st().key ^ zobrist::side();
        if !captured.is_none() {
            k ^= zobrist::psq(captured, to);
        }
        k ^ zobrist::psq(pc, to) ^ zobrist::psq(pc, from)
    }
}

impl Setup {
    /// Same position seen from the other side: ranks mirrored, colors swapped.
    pub fn flipped(&self) -> Setup {
        let mut board = [Piece::NONE; 64];
        for s in Square::all() {
            board[s.flip_rank().index()] = self.board[s.index()].flipped();
        }
        Setup {
            board,
            side_to_move: !self.side_to_move,
            castling: self.castling.iter().map(|s| s.flip_rank()).collect(),
            ep_square: self.ep_square.map(Square::flip_rank),
            rule50: self.rule50,
            fullmove: self.fullmove,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_move_flips_side_and_key() {
        let mut pos = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(pos.ep_square(), Some(Square::E3));
        let key = pos.key();
        pos.do_null_move();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.ep_square(), None);
        assert_eq!(pos.key(), pos.compute_key());
        pos.undo_null_move();
        assert_eq!(pos.key(), key);
        assert_eq!(pos.ep_square(), Some(Square::E3));
    }

    #[test]
    fn key_after_matches_do_move_for_quiet_and_capture() {
        let mut pos = Position::from_fen("4k3/8/3p4/8/4N3/8/8/4K3 w - - 0 1").unwrap();
        for m in [Move::new(Square::E4, Square::C5), Move::new(Square::E4, Square::G5)] {
            let predicted = pos.key_after(m);
            pos.do_move(m);
            assert_eq!(pos.key(), predicted);
            pos.undo_move(m);
        }
        let capture = Move::new(Square::E4, Square::D6);
        let predicted = pos.key_after(capture);
        pos.do_move(capture);
        assert_eq!(pos.key(), predicted);
        assert_eq!(pos.captured_piece(), Piece::make(Color::Black, PieceType::PAWN));
    }

    #[test]
    fn flip_swaps_colors() {
        let mut pos = Position::from_fen("r3k3/8/8/8/8/8/4P3/4K2R w Kq - 3 10").unwrap();
        pos.flip();
        assert_eq!(pos.fen(), "4k2r/4p3/8/8/8/8/8/R3K3 b Qk - 3 10");
        pos.flip();
        assert_eq!(pos.fen(), "r3k3/8/8/8/8/8/4P3/4K2R w Kq - 3 10");
    }
}
