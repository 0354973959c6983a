use boardstate::bitboard::Bitboard;
use boardstate::types::*;
use boardstate::zobrist;
use boardstate::{Move, PackedPosition, Position, SetupError};
use pretty_assertions::assert_eq;

#[test]
fn start_position() {
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let a = Position::from_fen(fen).unwrap();
    let b = Position::from_fen(fen).unwrap();
    assert_ne!(a.key(), 0);
    assert_eq!(a.key(), b.key());
    assert_eq!(a.key(), Position::new().key());
    assert!(a.checkers().is_empty());
    for cr in CastlingRights::EACH {
        assert!(a.can_castle(cr));
    }
    assert_eq!(a.ep_square(), None);
}

#[test]
fn en_passant_removes_the_passed_pawn() {
    let mut pos = Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3").unwrap();
    assert_eq!(pos.ep_square(), Some(Square::F6));
    let m = Move::with_kind(Square::E5, Square::F6, MoveKind::EnPassant);
    assert!(pos.pseudo_legal(m) && pos.legal(m));
    let key = pos.key();

    pos.do_move(m);
    assert!(pos.empty(Square::F5));
    assert_eq!(pos.piece_on(Square::F6), Piece::make(Color::White, PieceType::PAWN));
    assert_eq!(pos.captured_piece(), Piece::make(Color::Black, PieceType::PAWN));
    assert_eq!(pos.count(Color::Black, PieceType::PAWN), 7);
    assert_eq!(pos.ep_square(), None);
    assert_eq!(pos.rule50_count(), 0);
    assert_eq!(pos.key(), pos.compute_key());

    pos.undo_move(m);
    assert_eq!(pos.key(), key);
    assert_eq!(pos.piece_on(Square::F5), Piece::make(Color::Black, PieceType::PAWN));
    assert_eq!(pos.ep_square(), Some(Square::F6));
}

#[test]
fn ep_square_only_set_when_capture_is_possible() {
    let mut pos = Position::from_fen("4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1").unwrap();
    pos.do_move(Move::new(Square::E2, Square::E4));
    assert_eq!(pos.ep_square(), Some(Square::E3));

    let mut quiet = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
    quiet.do_move(Move::new(Square::E2, Square::E4));
    assert_eq!(quiet.ep_square(), None);

    // The d4 pawn is pinned against its king along the rank.
    let mut pinned = Position::from_fen("8/8/8/8/k2p3R/8/4P3/4K3 w - - 0 1").unwrap();
    pinned.do_move(Move::new(Square::E2, Square::E4));
    assert_eq!(pinned.ep_square(), None);
}

#[test]
fn castling_through_check_is_illegal() {
    // The rook on f8 covers f1; e1 and g1 are not attacked.
    let pos = Position::from_fen("4kr2/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    let m = Move::with_kind(Square::E1, Square::H1, MoveKind::Castling);
    assert!(pos.pseudo_legal(m));
    assert!(!pos.legal(m));
    assert!((pos.attackers_to(Square::E1) & pos.pieces_c(Color::Black)).is_empty());
    assert!((pos.attackers_to(Square::G1) & pos.pieces_c(Color::Black)).is_empty());
    assert!(pos.parse_uci_move("e1g1").is_none());

    let free = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    assert!(free.legal(m));
    assert_eq!(free.parse_uci_move("e1g1"), Some(m));
}

#[test]
fn castling_rook_screening_the_king_square() {
    // King d1 with a b1 rook: after O-O-O the a1 queen sees c1.
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/qR1K4 w Q - 0 1").unwrap();
    let m = Move::with_kind(Square::D1, Square::B1, MoveKind::Castling);
    assert!(pos.pseudo_legal(m));
    assert!(!pos.legal(m));
    assert!(!boardstate::movegen::legal_moves(&pos).contains(&m));
    assert_eq!(pos.parse_uci_move("d1c1"), Some(Move::new(Square::D1, Square::C1)));
    assert!(pos.parse_uci_move("d1b1").is_none());
}

#[test]
fn castling_updates_board_and_rights() {
    let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let key = pos.key();
    let m = Move::with_kind(Square::E1, Square::A1, MoveKind::Castling);
    pos.do_move(m);
    assert_eq!(pos.piece_on(Square::C1), Piece::make(Color::White, PieceType::KING));
    assert_eq!(pos.piece_on(Square::D1), Piece::make(Color::White, PieceType::ROOK));
    assert!(pos.empty(Square::A1) && pos.empty(Square::E1));
    assert_eq!(pos.castling_rights(Color::White), CastlingRights::NONE);
    assert_eq!(pos.castling_rights(Color::Black), CastlingRights::BLACK);
    assert_eq!(pos.fen(), "r3k2r/8/8/8/8/8/8/2KR3R b kq - 1 1");
    assert_eq!(pos.key(), pos.compute_key());
    pos.undo_move(m);
    assert_eq!(pos.key(), key);
}

#[test]
fn promotion_capture_updates_material() {
    let mut pos = Position::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let before_npm = (pos.non_pawn_material(Color::White), pos.non_pawn_material(Color::Black));
    let m = Move::promotion(Square::A7, Square::B8, PieceType::QUEEN);
    assert!(pos.legal(m));
    assert!(pos.gives_check(m));

    pos.do_move(m);
    assert_eq!(pos.count(Color::White, PieceType::PAWN), 0);
    assert_eq!(pos.count(Color::White, PieceType::QUEEN), 1);
    assert_eq!(pos.count(Color::Black, PieceType::ROOK), 0);
    assert_eq!(pos.non_pawn_material(Color::White), before_npm.0 + QUEEN_VALUE_MG);
    assert_eq!(pos.non_pawn_material(Color::Black), before_npm.1 - ROOK_VALUE_MG);
    assert_eq!(pos.material_key(), zobrist::compute_material_key(pos.board()));
    assert_eq!(pos.pawn_key(), zobrist::compute_pawn_key(pos.board()));
    assert_eq!(pos.checkers(), Bitboard::from(Square::B8));

    let same = Position::from_fen("1Q2k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
    assert_eq!(pos.material_key(), same.material_key());
    assert_eq!(pos.key(), same.key());
    pos.undo_move(m);
    assert_eq!(pos.piece_on(Square::B8), Piece::make(Color::Black, PieceType::ROOK));
    assert_eq!(pos.piece_on(Square::A7), Piece::make(Color::White, PieceType::PAWN));
}

#[test]
fn packed_record_round_trip() {
    for fen in [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - - 17 40",
    ] {
        let pos = Position::from_fen(fen).unwrap();
        let hex = pos.pack().to_hex();
        let record = PackedPosition::from_hex(&hex).unwrap();
        let back = Position::from_packed(&record, pos.game_ply()).unwrap();
        assert_eq!(back.fen(), fen);
    }
}

#[test]
fn malformed_setups_are_reported() {
    assert!(matches!(Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1"), Err(SetupError::KingCount { .. })));
    assert!(matches!(Position::from_fen("4k3/8/8/8/8/8/8/4K2R w - -"), Ok(_)));
    assert!(matches!(Position::from_fen("4k3/8/8/8/8/8/8/4K2R"), Err(SetupError::Fen(_))));
    assert!(matches!(Position::from_fen("4k2R/8/8/8/8/8/8/4K3 w - - 0 1"), Err(SetupError::OpponentInCheck)));
    assert!(matches!(Position::from_fen("P3k3/8/8/8/8/8/8/4K3 w - - 0 1"), Err(SetupError::PawnOnBackRank(_))));
}
