use crate::bitboard::{between_bb, pseudo_attacks, Bitboard};
use crate::board::Board;
use crate::types::*;
use std::sync::OnceLock;

pub type Key = u64;

/// xorshift64* generator with a fixed seed: keys are identical on every run.
struct Prng(u64);

impl Prng {
    fn rand64(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(2_685_821_657_736_338_717)
    }
}

struct Keys {
    psq: [[Key; 64]; Piece::NB],
    enpassant: [Key; 8],
    castling: [Key; CastlingRights::NB],
    side: Key,
    no_pawns: Key,
}

const CUCKOO_SIZE: usize = 8192;

struct Cuckoo {
    keys: [Key; CUCKOO_SIZE],
    moves: [Move; CUCKOO_SIZE],
}

static KEYS: OnceLock<Keys> = OnceLock::new();
static CUCKOO: OnceLock<Box<Cuckoo>> = OnceLock::new();

fn keys() -> &'static Keys {
    KEYS.get_or_init(|| {
        let mut rng = Prng(1_070_372);
        let mut k = Keys {
            psq: [[0; 64]; Piece::NB],
            enpassant: [0; 8],
            castling: [0; CastlingRights::NB],
            side: 0,
            no_pawns: 0,
        };
        for pc in Piece::EACH {
            for s in 0..64 { k.psq[pc.index()][s] = rng.rand64(); }
        }
        for f in 0..8 { k.enpassant[f] = rng.rand64(); }
        for cr in 0..CastlingRights::NB { k.castling[cr] = rng.rand64(); }
        k.side = rng.rand64();
        k.no_pawns = rng.rand64();
        k
    })
}

#[inline]
pub fn psq(pc: Piece, s: Square) -> Key { keys().psq[pc.index()][s.index()] }

/// Material key slot for the `count`-th piece of kind `pc` (0-based).
#[inline]
pub fn material(pc: Piece, count: usize) -> Key { keys().psq[pc.index()][count] }

#[inline]
pub fn enpassant(file: u8) -> Key { keys().enpassant[file as usize] }

#[inline]
pub fn castling(cr: CastlingRights) -> Key { keys().castling[cr.index()] }

#[inline]
pub fn side() -> Key { keys().side }

#[inline]
pub fn no_pawns() -> Key { keys().no_pawns }

#[inline]
fn h1(k: Key) -> usize { (k & 0x1FFF) as usize }

#[inline]
fn h2(k: Key) -> usize { ((k >> 16) & 0x1FFF) as usize }

fn cuckoo() -> &'static Cuckoo {
    CUCKOO.get_or_init(|| {
        let mut t = Box::new(Cuckoo { keys: [0; CUCKOO_SIZE], moves: [Move::NONE; CUCKOO_SIZE] });
        let mut count = 0usize;
        for pc in Piece::EACH {
            if pc.piece_type() == PieceType::PAWN { continue; }
            for s1 in 0..64u8 {
                for s2 in (s1 + 1)..64u8 {
                    let (s1, s2) = (Square(s1), Square(s2));
                    if !pseudo_attacks(pc.piece_type(), s1).contains(s2) { continue; }
                    let mut mv = Move::new(s1, s2);
                    let mut key = psq(pc, s1) ^ psq(pc, s2) ^ side();
                    let mut i = h1(key);
                    let mut kicks = 0;
                    loop {
                        std::mem::swap(&mut t.keys[i], &mut key);
                        std::mem::swap(&mut t.moves[i], &mut mv);
                        if mv == Move::NONE { break; }
                        kicks += 1;
                        if kicks > CUCKOO_SIZE {
                            log::warn!("cuckoo table insertion did not settle, dropping {}", mv);
                            break;
                        }
                        i = if i == h1(key) { h2(key) } else { h1(key) };
                    }
                    count += 1;
                }
            }
        }
        debug_assert_eq!(count, 3668);
        t
    })
}

/// Reversible move whose key delta (including the side flip) is `delta`, if
/// any non-pawn piece move has exactly that delta.
#[inline]
pub fn cuckoo_move(delta: Key) -> Option<Move> {
    let t = cuckoo();
    let i = h1(delta);
    if t.keys[i] == delta { return Some(t.moves[i]); }
    let i = h2(delta);
    if t.keys[i] == delta { return Some(t.moves[i]); }
    None
}

/// Squares a cuckoo move passes over, for the "path is clear" test.
#[inline]
pub fn cuckoo_path(m: Move) -> Bitboard { between_bb(m.from(), m.to()) }

pub fn init() {
    let _ = keys();
    let _ = cuckoo();
}

/// Full position key recomputed from scratch.
pub fn compute(board: &Board, stm: Color, castling_rights: CastlingRights, ep: Option<Square>) -> Key {
    let mut key = 0;
    for s in board.pieces() {
        key ^= psq(board.piece_on(s), s);
    }
    if let Some(ep) = ep { key ^= enpassant(ep.file()); }
    if stm == Color::Black { key ^= side(); }
    key ^ castling(castling_rights)
}

pub fn compute_pawn_key(board: &Board) -> Key {
    let mut key = no_pawns();
    for s in board.pieces_p(PieceType::PAWN) {
        key ^= psq(board.piece_on(s), s);
    }
    key
}

pub fn compute_material_key(board: &Board) -> Key {
    let mut key = 0;
    for pc in Piece::EACH {
        for cnt in 0..board.count_piece(pc) {
            key ^= material(pc, cnt);
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct_and_stable() {
        init();
        assert_ne!(psq(Piece::make(Color::White, PieceType::PAWN), Square::E2), 0);
        assert_ne!(side(), no_pawns());
        assert_ne!(castling(CastlingRights::ANY), castling(CastlingRights::NONE));
        assert_eq!(psq(Piece::EACH[3], Square::D4), psq(Piece::EACH[3], Square::D4));
    }

    #[test]
    fn cuckoo_finds_knight_shuffle() {
        let n = Piece::make(Color::White, PieceType::KNIGHT);
        let delta = psq(n, Square::G1) ^ psq(n, Square::F3) ^ side();
        let m = cuckoo_move(delta).expect("knight move must be in the cuckoo table");
        assert_eq!((m.from(), m.to()), (Square::G1, Square::F3));
        assert!(cuckoo_move(delta ^ 1).is_none());
    }
}
