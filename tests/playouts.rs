mod common;

use boardstate::movegen::legal_moves;
use boardstate::types::*;
use boardstate::{Move, PackedPosition, Position};
use pretty_assertions::assert_eq;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Everything a do/undo pair must restore.
#[derive(Debug, PartialEq, Eq)]
struct Snapshot {
    fen: String,
    key: u64,
    pawn_key: u64,
    material_key: u64,
    pieces: [u64; 8],
    squares: Vec<Vec<Square>>,
    checkers: u64,
    rule50: i32,
    ply: i32,
}

fn snapshot(pos: &Position) -> Snapshot {
    let mut pieces = [0; 8];
    for pt in PieceType::EACH {
        pieces[pt.index()] = pos.pieces_p(pt).0;
    }
    pieces[0] = pos.pieces_c(Color::White).0;
    pieces[7] = pos.pieces_c(Color::Black).0;
    // Slot order in the piece lists may change, the square sets may not.
    let mut squares = Vec::new();
    for c in Color::BOTH {
        for pt in PieceType::EACH {
            let mut list = pos.squares(c, pt).to_vec();
            list.sort();
            squares.push(list);
        }
    }
    Snapshot {
        fen: pos.fen(),
        key: pos.key(),
        pawn_key: pos.pawn_key(),
        material_key: pos.material_key(),
        pieces,
        squares,
        checkers: pos.checkers().0,
        rule50: pos.rule50_count(),
        ply: pos.game_ply(),
    }
}

/// Plays random legal moves from `fen`, calling `check` before every move.
fn playout(fen: &str, chess960: bool, seed: u64, plies: usize, mut check: impl FnMut(&mut Position, &mut cozy_chess::Board)) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut pos = Position::from_fen_960(fen, chess960).unwrap();
    let mut board = cozy_chess::Board::from_fen(fen, chess960).unwrap();
    for _ in 0..plies {
        check(&mut pos, &mut board);
        let moves = legal_moves(&pos);
        if moves.is_empty() {
            break;
        }
        let m = moves[rng.gen_range(0..moves.len())];
        let cm: cozy_chess::Move = m.to_uci(true).parse().unwrap();
        pos.do_move(m);
        board.play(cm);
    }
}

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

#[test]
fn do_undo_restores_everything() {
    for seed in 0..4 {
        playout(if seed % 2 == 0 { START } else { KIWIPETE }, false, seed, 120, |pos, _| {
            let before = snapshot(pos);
            for m in legal_moves(pos) {
                pos.do_move(m);
                pos.undo_move(m);
                assert_eq!(snapshot(pos), before, "after {}", m);
            }
        });
    }
}

#[test]
fn incremental_keys_match_recomputation() {
    for seed in 10..16 {
        playout(KIWIPETE, false, seed, 150, |pos, _| {
            assert_eq!(pos.key(), pos.compute_key());
            assert!(pos.pos_is_ok());
        });
    }
}

#[test]
fn fen_round_trip_reproduces_key() {
    for seed in 20..24 {
        playout(START, false, seed, 150, |pos, _| {
            let again = Position::from_fen(&pos.fen()).unwrap();
            assert_eq!(again.fen(), pos.fen());
            assert_eq!(again.key(), pos.key());
            assert_eq!(again.pawn_key(), pos.pawn_key());
            assert_eq!(again.material_key(), pos.material_key());
        });
    }
}

#[test]
fn legal_moves_match_cozy_chess() {
    for seed in 30..36 {
        let fen = if seed % 2 == 0 { START } else { KIWIPETE };
        playout(fen, false, seed, 200, |pos, board| {
            assert_eq!(common::our_moves(pos), common::cozy_moves(board), "{}", pos.fen());
            assert_eq!(pos.checkers().popcount(), board.checkers().len());
        });
    }
}

fn all_encodings() -> impl Iterator<Item = Move> {
    Square::all().flat_map(|from| {
        Square::all().flat_map(move |to| {
            [
                Move::new(from, to),
                Move::with_kind(from, to, MoveKind::EnPassant),
                Move::with_kind(from, to, MoveKind::Castling),
                Move::promotion(from, to, PieceType::KNIGHT),
                Move::promotion(from, to, PieceType::BISHOP),
                Move::promotion(from, to, PieceType::ROOK),
                Move::promotion(from, to, PieceType::QUEEN),
            ]
        })
    })
}

#[test]
fn pseudo_legal_and_legal_agree_with_cozy_chess() {
    for rec in common::load_positions() {
        let pos = common::position(&rec);
        let mut ours: Vec<String> =
            all_encodings().filter(|&m| pos.pseudo_legal(m) && pos.legal(m)).map(|m| m.to_uci(true)).collect();
        ours.sort();
        assert_eq!(ours, common::cozy_moves(&common::cozy_board(&rec)), "{}", rec.name);
    }
    for seed in 40..42 {
        playout(KIWIPETE, false, seed, 60, |pos, board| {
            let mut ours: Vec<String> =
                all_encodings().filter(|&m| pos.pseudo_legal(m) && pos.legal(m)).map(|m| m.to_uci(true)).collect();
            ours.sort();
            assert_eq!(ours, common::cozy_moves(board));
        });
    }
}

#[test]
fn gives_check_matches_board_after_move() {
    for seed in 50..56 {
        playout(if seed % 2 == 0 { KIWIPETE } else { START }, false, seed, 150, |pos, _| {
            for m in legal_moves(pos) {
                let predicted = pos.gives_check(m);
                pos.do_move(m);
                let us = pos.side_to_move();
                let attackers = pos.attackers_to(pos.king_square(us)) & pos.pieces_c(!us);
                assert_eq!(predicted, attackers.any(), "{} in {}", m, pos.fen());
                assert_eq!(pos.checkers(), attackers);
                pos.undo_move(m);
            }
        });
    }
}

#[test]
fn see_ge_is_a_threshold_on_see() {
    for seed in 60..66 {
        playout(KIWIPETE, false, seed, 120, |pos, _| {
            for m in legal_moves(pos) {
                let v = pos.see(m);
                for t in [v - 300, v - 1, v, v + 1, v + 300, -PAWN_VALUE_MG, 0, PAWN_VALUE_MG] {
                    assert_eq!(pos.see_ge(m, t), v >= t, "{} threshold {} in {}", m, t, pos.fen());
                }
            }
        });
    }
}

#[test]
fn packed_records_round_trip() {
    for seed in 70..76 {
        playout(if seed % 2 == 0 { START } else { KIWIPETE }, false, seed, 200, |pos, _| {
            let record = pos.pack();
            let back = Position::from_packed(&record, pos.game_ply()).unwrap();
            let (a, b) = (pos.to_setup(), back.to_setup());
            assert_eq!(b.board, a.board);
            assert_eq!(b.side_to_move, a.side_to_move);
            assert_eq!(b.castling, a.castling);
            assert_eq!(b.ep_square, a.ep_square);
            assert_eq!(b.rule50, a.rule50.min(127));
            assert_eq!(back.key(), pos.key());
            assert_eq!(PackedPosition::from_hex(&record.to_hex()), Some(record));
        });
    }
}

#[test]
fn chess960_playouts_match_cozy_chess() {
    for rec in common::load_positions().into_iter().filter(|r| r.chess960) {
        for seed in 80..83 {
            playout(&rec.fen, true, seed, 120, |pos, board| {
                assert_eq!(common::our_moves(pos), common::cozy_moves(board), "{}", pos.fen());
                assert_eq!(pos.key(), pos.compute_key());
                let before = snapshot(pos);
                for m in legal_moves(pos) {
                    pos.do_move(m);
                    pos.undo_move(m);
                }
                assert_eq!(snapshot(pos), before);
            });
        }
    }
}
