use boardstate::types::*;
use boardstate::{Move, Position};
use pretty_assertions::assert_eq;

#[test]
fn queen_side_castle_from_b_file() {
    let mut pos = Position::from_fen_960("4k3/8/8/8/8/8/8/RK6 w A - 0 1", true).unwrap();
    let m = Move::with_kind(Square::B1, Square::A1, MoveKind::Castling);
    assert!(pos.pseudo_legal(m) && pos.legal(m));
    assert_eq!(m.to_uci(true), "b1a1");
    assert_eq!(pos.parse_uci_move("b1a1"), Some(m));

    let key = pos.key();
    pos.do_move(m);
    assert_eq!(pos.fen(), "4k3/8/8/8/8/8/8/2KR4 b - - 1 1");
    assert_eq!(pos.key(), pos.compute_key());
    pos.undo_move(m);
    assert_eq!(pos.key(), key);
    assert_eq!(pos.fen(), "4k3/8/8/8/8/8/8/RK6 w A - 0 1");
}

#[test]
fn king_that_does_not_move() {
    let mut pos = Position::from_fen_960("4k3/8/8/8/8/8/8/6KR w H - 0 1", true).unwrap();
    let m = Move::with_kind(Square::G1, Square::H1, MoveKind::Castling);
    assert!(pos.legal(m));
    assert!(!pos.gives_check(m));
    pos.do_move(m);
    assert_eq!(pos.piece_on(Square::G1), Piece::make(Color::White, PieceType::KING));
    assert_eq!(pos.piece_on(Square::F1), Piece::make(Color::White, PieceType::ROOK));
    assert_eq!(pos.fen(), "4k3/8/8/8/8/8/8/5RK1 b - - 1 1");
    pos.undo_move(m);
    assert_eq!(pos.piece_on(Square::H1), Piece::make(Color::White, PieceType::ROOK));
}

#[test]
fn castling_rook_shielding_the_king_square() {
    // With the b1 rook gone, the a1 rook would hit the king on c1.
    let pos = Position::from_fen_960("4k3/8/8/8/8/8/8/rRK5 w B - 0 1", true).unwrap();
    let m = Move::with_kind(Square::C1, Square::B1, MoveKind::Castling);
    assert!(pos.pseudo_legal(m));
    assert!(!pos.legal(m));
}

#[test]
fn castling_rook_gives_check() {
    // After O-O the rook lands on f1 and checks the king on f8.
    let pos = Position::from_fen_960("5k2/8/8/8/8/8/8/4K2R w H - 0 1", true).unwrap();
    let m = Move::with_kind(Square::E1, Square::H1, MoveKind::Castling);
    assert!(pos.legal(m));
    assert!(pos.gives_check(m));
}

#[test]
fn shredder_letters_survive_round_trip() {
    let fen = "bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 2 9";
    let pos = Position::from_fen_960(fen, true).unwrap();
    assert_eq!(pos.fen(), fen);
    assert_eq!(pos.castling_rook_square(CastlingRights::WHITE_OO), Square::H1);
    assert_eq!(pos.castling_rook_square(CastlingRights::WHITE_OOO), Square::F1);
    assert!(pos.is_chess960());
}
