//! Fixed 32-byte position record for training-data pipelines.
//!
//! Bits are written least significant first: side to move, both king
//! squares, then every other square from a8 to h1 (rank by rank, file a
//! first) as a Huffman piece code plus a color bit, then castling rights,
//! the en-passant square and the half-move clock. Game ply is not stored.

use super::{Position, Setup};
use crate::error::PackedError;
use crate::eval::PieceObserver;
use crate::types::*;

/// (code, bit length) per piece type; empty squares are a single 0 bit.
const HUFFMAN: [(u32, u32); 6] = [(0b0000, 1), (0b0001, 4), (0b0011, 4), (0b0101, 4), (0b0111, 4), (0b1001, 4)];

const BITS: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PackedPosition(pub [u8; 32]);

impl PackedPosition {
    pub fn to_hex(&self) -> String { self.0.iter().map(|b| format!("{:02x}", b)).collect() }

    pub fn from_hex(s: &str) -> Option<PackedPosition> {
        if s.len() != 64 || !s.is_ascii() {
            return None;
        }
        let mut data = [0u8; 32];
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[2 * i..2 * i + 2], 16).ok()?;
        }
        Some(PackedPosition(data))
    }
}

struct BitWriter {
    data: [u8; 32],
    pos: usize,
}

impl BitWriter {
    fn write_bit(&mut self, bit: bool) {
        debug_assert!(self.pos < BITS);
        if bit {
            self.data[self.pos / 8] |= 1 << (self.pos % 8);
        }
        self.pos += 1;
    }

    fn write_n(&mut self, value: u32, n: u32) {
        for i in 0..n {
            self.write_bit(value & (1 << i) != 0);
        }
    }
}

struct BitReader<'a> {
    data: &'a [u8; 32],
    pos: usize,
}

impl BitReader<'_> {
    fn read_bit(&mut self) -> Result<bool, PackedError> {
        if self.pos >= BITS {
            return Err(PackedError::Overrun);
        }
        let bit = self.data[self.pos / 8] & (1 << (self.pos % 8)) != 0;
        self.pos += 1;
        Ok(bit)
    }

    fn read_n(&mut self, n: u32) -> Result<u32, PackedError> {
        let mut v = 0;
        for i in 0..n {
            v |= (self.read_bit()? as u32) << i;
        }
        Ok(v)
    }

    /// Piece type of the next square, `ALL` for an empty one.
    fn read_piece_type(&mut self) -> Result<PieceType, PackedError> {
        let mut code = 0;
        for bits in 1..=4 {
            code |= (self.read_bit()? as u32) << (bits - 1);
            if let Some(i) = HUFFMAN.iter().position(|&(c, b)| c == code && b == bits) {
                return Ok(PieceType(i as u8));
            }
        }
        Err(PackedError::BadCode(self.pos))
    }
}

/// Squares in stream order: rank 8 to rank 1, file a to h.
fn stream_order() -> impl Iterator<Item = Square> { (0..8u8).rev().flat_map(|r| (0..8u8).map(move |f| Square::new(f, r))) }

impl<O> Position<O> {
    pub fn pack(&self) -> PackedPosition {
        let mut w = BitWriter { data: [0; 32], pos: 0 };

        w.write_bit(self.side_to_move == Color::Black);
        w.write_n(self.king_square(Color::White).0 as u32, 6);
        w.write_n(self.king_square(Color::Black).0 as u32, 6);

        for s in stream_order() {
            let pc = self.piece_on(s);
            if pc.piece_type() == PieceType::KING {
                continue;
            }
            let (code, bits) = HUFFMAN[pc.piece_type().index()];
            w.write_n(code, bits);
            if !pc.is_none() {
                w.write_bit(pc.color() == Color::Black);
            }
        }

        for cr in CastlingRights::EACH {
            w.write_bit(self.can_castle(cr));
        }

        match self.ep_square() {
            Some(ep) => {
                w.write_bit(true);
                w.write_n(ep.0 as u32, 6);
            }
            None => w.write_bit(false),
        }

        w.write_n(self.rule50_count().clamp(0, 127) as u32, 7);
        PackedPosition(w.data)
    }
}

impl<O: PieceObserver> Position<O> {
    /// Loads a packed record. `mirror` flips every file. Castling rights are
    /// resolved to the outermost rooks, so Chess960 records do not round-trip.
    pub fn set_packed(&mut self, record: &PackedPosition, game_ply: i32, mirror: bool) -> Result<(), PackedError> {
        let setup = decode(record, mirror)?;
        self.set(&setup, false)?;
        self.game_ply = game_ply.max(0);
        Ok(())
    }
}

impl Position {
    pub fn from_packed(record: &PackedPosition, game_ply: i32) -> Result<Position, PackedError> {
        let mut pos = Position::new();
        pos.set_packed(record, game_ply, false)?;
        Ok(pos)
    }
}

fn decode(record: &PackedPosition, mirror: bool) -> Result<Setup, PackedError> {
    let flip = |s: Square| if mirror { s.flip_file() } else { s };
    let mut r = BitReader { data: &record.0, pos: 0 };
    let mut board = [Piece::NONE; 64];

    let side_to_move = if r.read_bit()? { Color::Black } else { Color::White };
    let wk = flip(Square(r.read_n(6)? as u8));
    let bk = flip(Square(r.read_n(6)? as u8));
    if wk == bk {
        return Err(PackedError::KingsCollide(wk));
    }
    board[wk.index()] = Piece::make(Color::White, PieceType::KING);
    board[bk.index()] = Piece::make(Color::Black, PieceType::KING);

    for s in stream_order() {
        let s = flip(s);
        if s == wk || s == bk {
            continue;
        }
        let pt = r.read_piece_type()?;
        if pt == PieceType::ALL {
            continue;
        }
        let c = if r.read_bit()? { Color::Black } else { Color::White };
        board[s.index()] = Piece::make(c, pt);
    }

    let mut setup = Setup { board, side_to_move, castling: Vec::new(), ep_square: None, rule50: 0, fullmove: 1 };

    for cr in CastlingRights::EACH {
        if !r.read_bit()? {
            continue;
        }
        let c = cr.color();
        let rook = Piece::make(c, PieceType::ROOK);
        let rank = RANK_1 ^ (c as u8 * 7);
        let mut files: Vec<u8> = (0..8).collect();
        if cr.is_king_side() {
            files.reverse();
        }
        let ksq = if c == Color::White { wk } else { bk };
        let rsq = files
            .into_iter()
            .map(|f| Square::new(f, rank))
            .take_while(|&s| s != ksq)
            .find(|&s| setup.piece_on(s) == rook);
        match rsq {
            Some(rsq) => setup.castling.push(rsq),
            None => return Err(crate::error::SetupError::BadCastling(ksq).into()),
        }
    }

    if r.read_bit()? {
        setup.ep_square = Some(flip(Square(r.read_n(6)? as u8)));
    }
    setup.rule50 = r.read_n(7)?;
    Ok(setup)
}
