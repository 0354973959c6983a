use crate::eval::PieceObserver;
use crate::movegen::legal_moves;
use crate::position::Position;
use crate::types::Move;

/// Leaf count of the legal move tree, using do/undo on a single position.
pub fn perft<O: PieceObserver>(pos: &mut Position<O>, depth: u32) -> u64 {
    if depth == 0 { return 1; }
    let moves = legal_moves(pos);
    if depth == 1 { return moves.len() as u64; }
    let mut nodes = 0u64;
    for m in moves {
        pos.do_move(m);
        nodes += perft(pos, depth - 1);
        pos.undo_move(m);
    }
    nodes
}

/// Per-root-move leaf counts, in generation order.
pub fn divide<O: PieceObserver>(pos: &mut Position<O>, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 { return Vec::new(); }
    legal_moves(pos)
        .into_iter()
        .map(|m| {
            pos.do_move(m);
            let n = perft(pos, depth - 1);
            pos.undo_move(m);
            (m, n)
        })
        .collect()
}
