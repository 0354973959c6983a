use crate::types::*;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::sync::OnceLock;

/// Set of squares, bit `n` standing for square `n`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

pub const FILE_A_BB: Bitboard = Bitboard(0x0101_0101_0101_0101);
pub const FILE_H_BB: Bitboard = Bitboard(0x8080_8080_8080_8080);
pub const RANK_1_BB: Bitboard = Bitboard(0xFF);
pub const RANK_8_BB: Bitboard = Bitboard(0xFF << 56);
pub const DARK_SQUARES: Bitboard = Bitboard(0xAA55_AA55_AA55_AA55);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    #[inline]
    pub fn from_square(s: Square) -> Bitboard { Bitboard(1u64 << s.0) }

    #[inline]
    pub fn is_empty(self) -> bool { self.0 == 0 }

    #[inline]
    pub fn any(self) -> bool { self.0 != 0 }

    #[inline]
    pub fn popcount(self) -> u32 { self.0.count_ones() }

    #[inline]
    pub fn more_than_one(self) -> bool { self.0 & self.0.wrapping_sub(1) != 0 }

    #[inline]
    pub fn contains(self, s: Square) -> bool { self.0 & (1u64 << s.0) != 0 }

    #[inline]
    pub fn lsb(self) -> Square {
        debug_assert!(self.any());
        Square(self.0.trailing_zeros() as u8)
    }

    #[inline]
    pub fn msb(self) -> Square {
        debug_assert!(self.any());
        Square(63 - self.0.leading_zeros() as u8)
    }

    /// Least significant square as a one-bit set.
    #[inline]
    pub fn lsb_bb(self) -> Bitboard { Bitboard(self.0 & self.0.wrapping_neg()) }

    #[inline]
    pub fn pop_lsb(&mut self) -> Square {
        let s = self.lsb();
        self.0 &= self.0 - 1;
        s
    }

    pub fn shift(self, d: Direction) -> Bitboard {
        let b = self.0;
        Bitboard(match d {
            NORTH => b << 8,
            SOUTH => b >> 8,
            EAST => (b & !FILE_H_BB.0) << 1,
            WEST => (b & !FILE_A_BB.0) >> 1,
            NORTH_EAST => (b & !FILE_H_BB.0) << 9,
            NORTH_WEST => (b & !FILE_A_BB.0) << 7,
            SOUTH_EAST => (b & !FILE_H_BB.0) >> 7,
            SOUTH_WEST => (b & !FILE_A_BB.0) >> 9,
            _ => 0,
        })
    }
}

impl From<Square> for Bitboard {
    #[inline]
    fn from(s: Square) -> Bitboard { Bitboard::from_square(s) }
}

impl Iterator for Bitboard {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> { if self.is_empty() { None } else { Some(self.pop_lsb()) } }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.popcount() as usize;
        (n, Some(n))
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitboard({:#018x})", self.0)?;
        for r in (0..8).rev() {
            for file in 0..8 {
                f.write_str(if self.contains(Square::new(file, r)) { " X" } else { " ." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

macro_rules! bb_ops {
    ($rhs:ty, $conv:expr) => {
        impl BitAnd<$rhs> for Bitboard {
            type Output = Bitboard;
            #[inline]
            fn bitand(self, rhs: $rhs) -> Bitboard { Bitboard(self.0 & $conv(rhs)) }
        }
        impl BitOr<$rhs> for Bitboard {
            type Output = Bitboard;
            #[inline]
            fn bitor(self, rhs: $rhs) -> Bitboard { Bitboard(self.0 | $conv(rhs)) }
        }
        impl BitXor<$rhs> for Bitboard {
            type Output = Bitboard;
            #[inline]
            fn bitxor(self, rhs: $rhs) -> Bitboard { Bitboard(self.0 ^ $conv(rhs)) }
        }
        impl BitAndAssign<$rhs> for Bitboard {
            #[inline]
            fn bitand_assign(&mut self, rhs: $rhs) { self.0 &= $conv(rhs); }
        }
        impl BitOrAssign<$rhs> for Bitboard {
            #[inline]
            fn bitor_assign(&mut self, rhs: $rhs) { self.0 |= $conv(rhs); }
        }
        impl BitXorAssign<$rhs> for Bitboard {
            #[inline]
            fn bitxor_assign(&mut self, rhs: $rhs) { self.0 ^= $conv(rhs); }
        }
    };
}

bb_ops!(Bitboard, |b: Bitboard| b.0);
bb_ops!(Square, |s: Square| 1u64 << s.0);

impl Not for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn not(self) -> Bitboard { Bitboard(!self.0) }
}

impl BitOr<Square> for Square {
    type Output = Bitboard;
    #[inline]
    fn bitor(self, rhs: Square) -> Bitboard { Bitboard::from_square(self) | rhs }
}

#[inline]
pub fn file_bb(file: u8) -> Bitboard { Bitboard(FILE_A_BB.0 << file) }

#[inline]
pub fn rank_bb(rank: u8) -> Bitboard { Bitboard(RANK_1_BB.0 << (8 * rank)) }

#[inline]
pub fn adjacent_files_bb(s: Square) -> Bitboard {
    let f = file_bb(s.file());
    f.shift(EAST) | f.shift(WEST)
}

/// Ranks strictly in front of `s` from `c`'s point of view.
pub fn forward_ranks_bb(c: Color, s: Square) -> Bitboard {
    let r = s.rank();
    match c {
        Color::White => if r == RANK_8 { Bitboard::EMPTY } else { Bitboard(!0u64 << (8 * (r + 1))) },
        Color::Black => if r == RANK_1 { Bitboard::EMPTY } else { Bitboard(!0u64 >> (8 * (8 - r))) },
    }
}

#[inline]
pub fn forward_file_bb(c: Color, s: Square) -> Bitboard { forward_ranks_bb(c, s) & file_bb(s.file()) }

#[inline]
pub fn pawn_attack_span(c: Color, s: Square) -> Bitboard { forward_ranks_bb(c, s) & adjacent_files_bb(s) }

#[inline]
pub fn passed_pawn_span(c: Color, s: Square) -> Bitboard { pawn_attack_span(c, s) | forward_file_bb(c, s) }

#[inline]
pub fn distance(a: Square, b: Square) -> u8 {
    let df = (a.file() as i8 - b.file() as i8).unsigned_abs();
    let dr = (a.rank() as i8 - b.rank() as i8).unsigned_abs();
    df.max(dr)
}

#[inline]
pub fn opposite_colors(a: Square, b: Square) -> bool { DARK_SQUARES.contains(a) != DARK_SQUARES.contains(b) }

/// Attacks of all pawns in `b` of color `c`.
#[inline]
pub fn pawn_attacks_bb(c: Color, b: Bitboard) -> Bitboard {
    match c {
        Color::White => b.shift(NORTH_WEST) | b.shift(NORTH_EAST),
        Color::Black => b.shift(SOUTH_WEST) | b.shift(SOUTH_EAST),
    }
}

// Rook directions first, then bishop directions.
const DIRS: [Direction; 8] = [NORTH, SOUTH, EAST, WEST, NORTH_EAST, NORTH_WEST, SOUTH_EAST, SOUTH_WEST];
const ROOK_DIRS: std::ops::Range<usize> = 0..4;
const BISHOP_DIRS: std::ops::Range<usize> = 4..8;

struct Tables {
    pawn: [[Bitboard; 64]; 2],
    pseudo: [[Bitboard; 64]; PieceType::NB],
    rays: [[Bitboard; 64]; 8],
    between: [[Bitboard; 64]; 64],
    line: [[Bitboard; 64]; 64],
}

static TABLES: OnceLock<Box<Tables>> = OnceLock::new();

fn step(s: Square, d: Direction) -> Option<Square> {
    let to = s.0 as i16 + d as i16;
    if !(0..64).contains(&to) { return None; }
    let to = Square(to as u8);
    if distance(s, to) <= 2 { Some(to) } else { None }
}

fn ray_from(s: Square, d: Direction) -> Bitboard {
    let mut b = Bitboard::EMPTY;
    let mut cur = s;
    while let Some(next) = step(cur, d).filter(|n| distance(cur, *n) == 1) {
        b |= next;
        cur = next;
    }
    b
}

fn slide(rays: &[[Bitboard; 64]; 8], dirs: std::ops::Range<usize>, s: Square, occupied: Bitboard) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for i in dirs {
        let ray = rays[i][s.index()];
        let blockers = ray & occupied;
        if blockers.is_empty() {
            attacks |= ray;
            continue;
        }
        let first = if DIRS[i] > 0 { blockers.lsb() } else { blockers.msb() };
        attacks |= ray ^ rays[i][first.index()];
    }
    attacks
}

fn build() -> Box<Tables> {
    let mut t = Box::new(Tables {
        pawn: [[Bitboard::EMPTY; 64]; 2],
        pseudo: [[Bitboard::EMPTY; 64]; PieceType::NB],
        rays: [[Bitboard::EMPTY; 64]; 8],
        between: [[Bitboard::EMPTY; 64]; 64],
        line: [[Bitboard::EMPTY; 64]; 64],
    });

    for s in Square::all() {
        let bb = Bitboard::from_square(s);
        t.pawn[Color::White.index()][s.index()] = pawn_attacks_bb(Color::White, bb);
        t.pawn[Color::Black.index()][s.index()] = pawn_attacks_bb(Color::Black, bb);

        for d in [17, 15, 10, 6, -6, -10, -15, -17] {
            if let Some(to) = step(s, d) { t.pseudo[PieceType::KNIGHT.index()][s.index()] |= to; }
        }
        for d in DIRS {
            if let Some(to) = step(s, d).filter(|to| distance(s, *to) == 1) {
                t.pseudo[PieceType::KING.index()][s.index()] |= to;
            }
        }
        for (i, d) in DIRS.iter().enumerate() {
            t.rays[i][s.index()] = ray_from(s, *d);
        }
    }

    for s in Square::all() {
        let rook = slide(&t.rays, ROOK_DIRS, s, Bitboard::EMPTY);
        let bishop = slide(&t.rays, BISHOP_DIRS, s, Bitboard::EMPTY);
        t.pseudo[PieceType::ROOK.index()][s.index()] = rook;
        t.pseudo[PieceType::BISHOP.index()][s.index()] = bishop;
        t.pseudo[PieceType::QUEEN.index()][s.index()] = rook | bishop;
    }

    for s1 in Square::all() {
        for (pt, dirs) in [(PieceType::BISHOP, BISHOP_DIRS), (PieceType::ROOK, ROOK_DIRS)] {
            for s2 in t.pseudo[pt.index()][s1.index()] {
                t.line[s1.index()][s2.index()] =
                    (t.pseudo[pt.index()][s1.index()] & t.pseudo[pt.index()][s2.index()]) | s1 | s2;
                t.between[s1.index()][s2.index()] = slide(&t.rays, dirs.clone(), s1, Bitboard::from_square(s2))
                    & slide(&t.rays, dirs.clone(), s2, Bitboard::from_square(s1));
            }
        }
    }
    t
}

#[inline]
fn tables() -> &'static Tables { TABLES.get_or_init(build) }

/// Forces table construction; everything else builds lazily on first use.
pub fn init() { let _ = tables(); }

#[inline]
pub fn pawn_attacks(c: Color, s: Square) -> Bitboard { tables().pawn[c.index()][s.index()] }

/// Attacks of a piece of type `pt` on an empty board. Not valid for pawns.
#[inline]
pub fn pseudo_attacks(pt: PieceType, s: Square) -> Bitboard { tables().pseudo[pt.index()][s.index()] }

/// Attacks of a non-pawn piece of type `pt` on `s` given `occupied`.
#[inline]
pub fn attacks_bb(pt: PieceType, s: Square, occupied: Bitboard) -> Bitboard {
    let t = tables();
    match pt {
        PieceType::BISHOP => slide(&t.rays, BISHOP_DIRS, s, occupied),
        PieceType::ROOK => slide(&t.rays, ROOK_DIRS, s, occupied),
        PieceType::QUEEN => slide(&t.rays, 0..8, s, occupied),
        _ => t.pseudo[pt.index()][s.index()],
    }
}

/// Squares strictly between `a` and `b`, empty when they share no line.
#[inline]
pub fn between_bb(a: Square, b: Square) -> Bitboard { tables().between[a.index()][b.index()] }

/// The whole line through `a` and `b` (edge to edge), empty when not aligned.
#[inline]
pub fn line_bb(a: Square, b: Square) -> Bitboard { tables().line[a.index()][b.index()] }

#[inline]
pub fn aligned(a: Square, b: Square, c: Square) -> bool { line_bb(a, b).contains(c) }
