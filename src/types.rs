use std::fmt;
use std::ops::{Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, Neg, Not, Sub, SubAssign};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub fn index(self) -> usize { self as usize }
}

impl Not for Color {
    type Output = Color;
    #[inline]
    fn not(self) -> Color { if self == Color::White { Color::Black } else { Color::White } }
}

/// Piece kind. Index 0 doubles as the "all pieces" slot of per-type tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PieceType(pub u8);

impl PieceType {
    pub const ALL: PieceType = PieceType(0);
    pub const PAWN: PieceType = PieceType(1);
    pub const KNIGHT: PieceType = PieceType(2);
    pub const BISHOP: PieceType = PieceType(3);
    pub const ROOK: PieceType = PieceType(4);
    pub const QUEEN: PieceType = PieceType(5);
    pub const KING: PieceType = PieceType(6);
    pub const NB: usize = 8;

    pub const EACH: [PieceType; 6] = [
        PieceType::PAWN,
        PieceType::KNIGHT,
        PieceType::BISHOP,
        PieceType::ROOK,
        PieceType::QUEEN,
        PieceType::KING,
    ];

    #[inline]
    pub fn index(self) -> usize { self.0 as usize }

    pub fn to_char(self) -> char { b" pnbrqk"[self.index().min(6)] as char }

    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::PAWN),
            'n' => Some(PieceType::KNIGHT),
            'b' => Some(PieceType::BISHOP),
            'r' => Some(PieceType::ROOK),
            'q' => Some(PieceType::QUEEN),
            'k' => Some(PieceType::KING),
            _ => None,
        }
    }
}

/// Colored piece. White pieces are 1..=6, black pieces 9..=14, so the value
/// indexes 16-entry tables directly and `Piece::make(c, ALL)` gives the
/// per-color aggregate slot (0 or 8).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Piece(pub u8);

impl Piece {
    pub const NONE: Piece = Piece(0);
    pub const NB: usize = 16;

    pub const EACH: [Piece; 12] = [
        Piece(1), Piece(2), Piece(3), Piece(4), Piece(5), Piece(6),
        Piece(9), Piece(10), Piece(11), Piece(12), Piece(13), Piece(14),
    ];

    #[inline]
    pub fn make(c: Color, pt: PieceType) -> Piece { Piece(((c as u8) << 3) | pt.0) }

    #[inline]
    pub fn color(self) -> Color { if self.0 & 8 == 0 { Color::White } else { Color::Black } }

    #[inline]
    pub fn piece_type(self) -> PieceType { PieceType(self.0 & 7) }

    #[inline]
    pub fn is_none(self) -> bool { self.0 == 0 }

    #[inline]
    pub fn index(self) -> usize { self.0 as usize }

    /// Same kind, other color.
    #[inline]
    pub fn flipped(self) -> Piece { if self.is_none() { self } else { Piece(self.0 ^ 8) } }

    pub fn to_char(self) -> char {
        let c = self.piece_type().to_char();
        if self.color() == Color::White { c.to_ascii_uppercase() } else { c }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        let pt = PieceType::from_char(c)?;
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        Some(Piece::make(color, pt))
    }
}

pub type Direction = i8;

pub const NORTH: Direction = 8;
pub const SOUTH: Direction = -8;
pub const EAST: Direction = 1;
pub const WEST: Direction = -1;
pub const NORTH_EAST: Direction = 9;
pub const NORTH_WEST: Direction = 7;
pub const SOUTH_EAST: Direction = -7;
pub const SOUTH_WEST: Direction = -9;

#[inline]
pub fn pawn_push(c: Color) -> Direction { if c == Color::White { NORTH } else { SOUTH } }

/// Board square, a1 = 0 .. h8 = 63.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Square(pub u8);

macro_rules! squares {
    ($($name:ident = $v:expr),* $(,)?) => {
        impl Square { $(pub const $name: Square = Square($v);)* }
    };
}

squares! {
    A1 = 0, B1 = 1, C1 = 2, D1 = 3, E1 = 4, F1 = 5, G1 = 6, H1 = 7,
    A2 = 8, B2 = 9, C2 = 10, D2 = 11, E2 = 12, F2 = 13, G2 = 14, H2 = 15,
    A3 = 16, B3 = 17, C3 = 18, D3 = 19, E3 = 20, F3 = 21, G3 = 22, H3 = 23,
    A4 = 24, B4 = 25, C4 = 26, D4 = 27, E4 = 28, F4 = 29, G4 = 30, H4 = 31,
    A5 = 32, B5 = 33, C5 = 34, D5 = 35, E5 = 36, F5 = 37, G5 = 38, H5 = 39,
    A6 = 40, B6 = 41, C6 = 42, D6 = 43, E6 = 44, F6 = 45, G6 = 46, H6 = 47,
    A7 = 48, B7 = 49, C7 = 50, D7 = 51, E7 = 52, F7 = 53, G7 = 54, H7 = 55,
    A8 = 56, B8 = 57, C8 = 58, D8 = 59, E8 = 60, F8 = 61, G8 = 62, H8 = 63,
}

pub const RANK_1: u8 = 0;
pub const RANK_2: u8 = 1;
pub const RANK_3: u8 = 2;
pub const RANK_4: u8 = 3;
pub const RANK_5: u8 = 4;
pub const RANK_6: u8 = 5;
pub const RANK_7: u8 = 6;
pub const RANK_8: u8 = 7;

impl Square {
    pub const NB: usize = 64;

    #[inline]
    pub fn new(file: u8, rank: u8) -> Square { Square((rank << 3) | file) }

    #[inline]
    pub fn file(self) -> u8 { self.0 & 7 }

    #[inline]
    pub fn rank(self) -> u8 { self.0 >> 3 }

    #[inline]
    pub fn index(self) -> usize { self.0 as usize }

    /// Rank as seen from `c`'s side of the board.
    #[inline]
    pub fn relative_rank(self, c: Color) -> u8 { self.rank() ^ (c as u8 * 7) }

    /// `self` for white, vertically mirrored for black.
    #[inline]
    pub fn relative(self, c: Color) -> Square { Square(self.0 ^ (c as u8 * 56)) }

    #[inline]
    pub fn flip_rank(self) -> Square { Square(self.0 ^ 56) }

    #[inline]
    pub fn flip_file(self) -> Square { Square(self.0 ^ 7) }

    /// Caller guarantees the result stays on the board.
    #[inline]
    pub fn offset(self, d: Direction) -> Square { Square((self.0 as i8 + d) as u8) }

    pub fn all() -> impl Iterator<Item = Square> { (0..64u8).map(Square) }

    pub fn parse(s: &str) -> Option<Square> {
        let b = s.as_bytes();
        if b.len() != 2 { return None; }
        let (f, r) = (b[0], b[1]);
        if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) { return None; }
        Some(Square::new(f - b'a', r - b'1'))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, (b'1' + self.rank()) as char)
    }
}

/// Set of castling rights, one bit per (color, side).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_OO: CastlingRights = CastlingRights(1);
    pub const WHITE_OOO: CastlingRights = CastlingRights(2);
    pub const BLACK_OO: CastlingRights = CastlingRights(4);
    pub const BLACK_OOO: CastlingRights = CastlingRights(8);
    pub const KING_SIDE: CastlingRights = CastlingRights(1 | 4);
    pub const QUEEN_SIDE: CastlingRights = CastlingRights(2 | 8);
    pub const WHITE: CastlingRights = CastlingRights(1 | 2);
    pub const BLACK: CastlingRights = CastlingRights(4 | 8);
    pub const ANY: CastlingRights = CastlingRights(15);
    pub const NB: usize = 16;

    pub const EACH: [CastlingRights; 4] = [
        CastlingRights::WHITE_OO,
        CastlingRights::WHITE_OOO,
        CastlingRights::BLACK_OO,
        CastlingRights::BLACK_OOO,
    ];

    #[inline]
    pub fn of(c: Color) -> CastlingRights { if c == Color::White { CastlingRights::WHITE } else { CastlingRights::BLACK } }

    /// The single right for `c` castling towards the king side or queen side.
    #[inline]
    pub fn single(c: Color, king_side: bool) -> CastlingRights {
        let side = if king_side { CastlingRights::KING_SIDE } else { CastlingRights::QUEEN_SIDE };
        CastlingRights::of(c) & side
    }

    #[inline]
    pub fn index(self) -> usize { self.0 as usize }

    #[inline]
    pub fn is_empty(self) -> bool { self.0 == 0 }

    #[inline]
    pub fn intersects(self, other: CastlingRights) -> bool { self.0 & other.0 != 0 }

    #[inline]
    pub fn is_king_side(self) -> bool { self.intersects(CastlingRights::KING_SIDE) }

    pub fn color(self) -> Color { if self.intersects(CastlingRights::WHITE) { Color::White } else { Color::Black } }
}

impl BitOr for CastlingRights {
    type Output = CastlingRights;
    #[inline]
    fn bitor(self, rhs: CastlingRights) -> CastlingRights { CastlingRights(self.0 | rhs.0) }
}

impl BitAnd for CastlingRights {
    type Output = CastlingRights;
    #[inline]
    fn bitand(self, rhs: CastlingRights) -> CastlingRights { CastlingRights(self.0 & rhs.0) }
}

impl Not for CastlingRights {
    type Output = CastlingRights;
    #[inline]
    fn not(self) -> CastlingRights { CastlingRights(!self.0 & 15) }
}

impl BitOrAssign for CastlingRights {
    #[inline]
    fn bitor_assign(&mut self, rhs: CastlingRights) { self.0 |= rhs.0; }
}

impl BitAndAssign for CastlingRights {
    #[inline]
    fn bitand_assign(&mut self, rhs: CastlingRights) { self.0 &= rhs.0; }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal = 0,
    Promotion = 1,
    EnPassant = 2,
    Castling = 3,
}

/// 16-bit move: bits 0-5 destination, 6-11 origin, 12-13 promotion piece
/// (knight..queen), 14-15 kind. Castling is stored as "king takes own rook".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Move(pub u16);

impl Move {
    pub const NONE: Move = Move(0);
    pub const NULL: Move = Move(65);

    #[inline]
    pub fn new(from: Square, to: Square) -> Move { Move(((from.0 as u16) << 6) | to.0 as u16) }

    #[inline]
    pub fn with_kind(from: Square, to: Square, kind: MoveKind) -> Move {
        Move(Move::new(from, to).0 | ((kind as u16) << 14))
    }

    #[inline]
    pub fn promotion(from: Square, to: Square, pt: PieceType) -> Move {
        debug_assert!(pt >= PieceType::KNIGHT && pt <= PieceType::QUEEN);
        Move(Move::with_kind(from, to, MoveKind::Promotion).0 | (((pt.0 - PieceType::KNIGHT.0) as u16) << 12))
    }

    #[inline]
    pub fn from(self) -> Square { Square(((self.0 >> 6) & 0x3F) as u8) }

    #[inline]
    pub fn to(self) -> Square { Square((self.0 & 0x3F) as u8) }

    #[inline]
    pub fn kind(self) -> MoveKind {
        match self.0 >> 14 {
            0 => MoveKind::Normal,
            1 => MoveKind::Promotion,
            2 => MoveKind::EnPassant,
            _ => MoveKind::Castling,
        }
    }

    /// Only meaningful for promotions.
    #[inline]
    pub fn promotion_type(self) -> PieceType { PieceType(((self.0 >> 12) & 3) as u8 + PieceType::KNIGHT.0) }

    /// False for `NONE`, `NULL` and anything else whose origin equals its destination.
    #[inline]
    pub fn is_ok(self) -> bool { self.from() != self.to() }

    /// UCI text. Castling is written as the king's two-square step unless
    /// `chess960` is set, in which case the internal king-takes-rook form is kept.
    pub fn to_uci(self, chess960: bool) -> String {
        if self == Move::NONE { return "(none)".to_string(); }
        if self == Move::NULL { return "0000".to_string(); }
        let from = self.from();
        let mut to = self.to();
        if self.kind() == MoveKind::Castling && !chess960 {
            let file = if to > from { 6 } else { 2 };
            to = Square::new(file, from.rank());
        }
        let mut s = format!("{}{}", from, to);
        if self.kind() == MoveKind::Promotion { s.push(self.promotion_type().to_char()); }
        s
    }
}

/// Raw form: castling prints as king-to-rook.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.to_uci(true)) }
}

pub type Value = i32;

pub const VALUE_ZERO: Value = 0;
pub const PAWN_VALUE_MG: Value = 124;
pub const PAWN_VALUE_EG: Value = 206;
pub const KNIGHT_VALUE_MG: Value = 781;
pub const KNIGHT_VALUE_EG: Value = 854;
pub const BISHOP_VALUE_MG: Value = 825;
pub const BISHOP_VALUE_EG: Value = 915;
pub const ROOK_VALUE_MG: Value = 1276;
pub const ROOK_VALUE_EG: Value = 1380;
pub const QUEEN_VALUE_MG: Value = 2538;
pub const QUEEN_VALUE_EG: Value = 2682;

const PIECE_VALUE_MG: [Value; PieceType::NB] =
    [0, PAWN_VALUE_MG, KNIGHT_VALUE_MG, BISHOP_VALUE_MG, ROOK_VALUE_MG, QUEEN_VALUE_MG, 0, 0];
const PIECE_VALUE_EG: [Value; PieceType::NB] =
    [0, PAWN_VALUE_EG, KNIGHT_VALUE_EG, BISHOP_VALUE_EG, ROOK_VALUE_EG, QUEEN_VALUE_EG, 0, 0];

/// Midgame material value; kings and empty squares are worth zero.
#[inline]
pub fn piece_value_mg(pt: PieceType) -> Value { PIECE_VALUE_MG[pt.index()] }

#[inline]
pub fn piece_value_eg(pt: PieceType) -> Value { PIECE_VALUE_EG[pt.index()] }

/// Midgame/endgame pair accumulated incrementally by the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Score {
    pub mg: Value,
    pub eg: Value,
}

impl Score {
    pub const ZERO: Score = Score { mg: 0, eg: 0 };

    #[inline]
    pub const fn new(mg: Value, eg: Value) -> Score { Score { mg, eg } }
}

impl Add for Score {
    type Output = Score;
    #[inline]
    fn add(self, rhs: Score) -> Score { Score::new(self.mg + rhs.mg, self.eg + rhs.eg) }
}

impl Sub for Score {
    type Output = Score;
    #[inline]
    fn sub(self, rhs: Score) -> Score { Score::new(self.mg - rhs.mg, self.eg - rhs.eg) }
}

impl Neg for Score {
    type Output = Score;
    #[inline]
    fn neg(self) -> Score { Score::new(-self.mg, -self.eg) }
}

impl AddAssign for Score {
    #[inline]
    fn add_assign(&mut self, rhs: Score) { *self = *self + rhs; }
}

impl SubAssign for Score {
    #[inline]
    fn sub_assign(&mut self, rhs: Score) { *self = *self - rhs; }
}
