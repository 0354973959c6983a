#![allow(dead_code)]

use boardstate::movegen::legal_moves;
use boardstate::Position;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};

#[derive(Debug, Clone, Deserialize)]
pub struct PosRec {
    pub name: String,
    pub fen: String,
    #[serde(default)]
    pub chess960: bool,
    /// Leaf counts for depth 1, 2, ...
    #[serde(default)]
    pub perft: Vec<u64>,
}

fn read_jsonl(path: &str) -> Option<Vec<PosRec>> {
    let f = File::open(path).ok()?;
    let rdr = BufReader::new(f);
    Some(
        rdr.lines()
            .map_while(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(&l).ok())
            .collect(),
    )
}

/// Fixture positions; `BOARDSTATE_TEST_POSITIONS` points at an alternative file.
pub fn load_positions() -> Vec<PosRec> {
    if let Ok(path) = std::env::var("BOARDSTATE_TEST_POSITIONS") {
        if let Some(recs) = read_jsonl(&path) {
            return recs;
        }
    }
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/positions.jsonl");
    read_jsonl(path).expect("open bundled positions.jsonl")
}

pub fn position(rec: &PosRec) -> Position {
    Position::from_fen_960(&rec.fen, rec.chess960).unwrap_or_else(|e| panic!("{}: {}", rec.name, e))
}

pub fn cozy_board(rec: &PosRec) -> cozy_chess::Board {
    cozy_chess::Board::from_fen(&rec.fen, rec.chess960).unwrap_or_else(|e| panic!("{}: {:?}", rec.name, e))
}

/// Legal moves in king-takes-rook UCI, sorted.
pub fn our_moves<O>(pos: &Position<O>) -> Vec<String> {
    let mut v: Vec<String> = legal_moves(pos).into_iter().map(|m| m.to_uci(true)).collect();
    v.sort();
    v
}

/// cozy-chess writes castling as king-takes-rook too.
pub fn cozy_moves(board: &cozy_chess::Board) -> Vec<String> {
    let mut v = Vec::new();
    board.generate_moves(|moves| {
        v.extend(moves.into_iter().map(|m| m.to_string()));
        false
    });
    v.sort();
    v
}

pub fn cozy_perft(board: &cozy_chess::Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    board.generate_moves(|moves| {
        for m in moves {
            let mut child = board.clone();
            child.play_unchecked(m);
            nodes += cozy_perft(&child, depth - 1);
        }
        false
    });
    nodes
}
