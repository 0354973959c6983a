//! Straightforward legal move enumeration: candidate moves per piece,
//! filtered through `pseudo_legal` and `legal`. Meant for draw detection,
//! perft and tools rather than search speed.

use crate::bitboard::*;
use crate::position::Position;
use crate::types::*;

const PROMOTIONS: [PieceType; 4] = [PieceType::QUEEN, PieceType::KNIGHT, PieceType::ROOK, PieceType::BISHOP];

/// Calls `visit` with every legal move until it returns `true`. Returns
/// whether enumeration was stopped early.
pub fn generate<O, F>(pos: &Position<O>, mut visit: F) -> bool
where
    F: FnMut(Move) -> bool,
{
    let us = pos.side_to_move();
    let own = pos.pieces_c(us);
    let enemies = pos.pieces_c(!us);
    let occupied = pos.pieces();

    let mut emit = |m: Move| {
        debug_assert!(pos.pseudo_legal(m), "generated {} which is not pseudo-legal", m);
        pos.legal(m) && visit(m)
    };

    for pt in [PieceType::KNIGHT, PieceType::BISHOP, PieceType::ROOK, PieceType::QUEEN, PieceType::KING] {
        for from in pos.pieces_cp(us, pt) {
            for to in attacks_bb(pt, from, occupied) & !own {
                if emit(Move::new(from, to)) {
                    return true;
                }
            }
        }
    }

    let push = pawn_push(us);
    for from in pos.pieces_cp(us, PieceType::PAWN) {
        let one = from.offset(push);
        let mut targets = pawn_attacks(us, from) & enemies;
        if pos.empty(one) {
            targets |= one;
            if from.relative_rank(us) == RANK_2 && pos.empty(one.offset(push)) {
                targets |= one.offset(push);
            }
        }
        for to in targets {
            if to.relative_rank(us) == RANK_8 {
                for pt in PROMOTIONS {
                    if emit(Move::promotion(from, to, pt)) {
                        return true;
                    }
                }
            } else if emit(Move::new(from, to)) {
                return true;
            }
        }
        if let Some(ep) = pos.ep_square() {
            if pawn_attacks(us, from).contains(ep) && emit(Move::with_kind(from, ep, MoveKind::EnPassant)) {
                return true;
            }
        }
    }

    for king_side in [true, false] {
        let cr = CastlingRights::single(us, king_side);
        if pos.can_castle(cr) && !pos.castling_impeded(cr) {
            let m = Move::with_kind(pos.king_square(us), pos.castling_rook_square(cr), MoveKind::Castling);
            if emit(m) {
                return true;
            }
        }
    }
    false
}

pub fn legal_moves<O>(pos: &Position<O>) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    generate(pos, |m| {
        moves.push(m);
        false
    });
    moves
}

pub fn has_legal_move<O>(pos: &Position<O>) -> bool { generate(pos, |_| true) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_has_twenty_moves() {
        let pos = Position::new();
        assert_eq!(legal_moves(&pos).len(), 20);
        assert!(has_legal_move(&pos));
    }

    #[test]
    fn checkmate_has_no_moves() {
        let pos = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert!(pos.in_check());
        assert!(legal_moves(&pos).is_empty());
        assert!(!has_legal_move(&pos));
    }

    #[test]
    fn promotions_come_in_fours() {
        let pos = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let promos = legal_moves(&pos).into_iter().filter(|m| m.kind() == MoveKind::Promotion).count();
        assert_eq!(promos, 4);
    }
}
