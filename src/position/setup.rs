use super::Position;
use crate::error::{FenError, SetupError};
use crate::eval::PieceObserver;
use crate::movegen;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Plain description of a position, as read from FEN. Holds no derived
/// data and performs no validation beyond syntax; `Position::set` does that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Setup {
    pub board: [Piece; 64],
    pub side_to_move: Color,
    /// Origin squares of rooks that may still castle.
    pub castling: Vec<Square>,
    pub ep_square: Option<Square>,
    pub rule50: u32,
    pub fullmove: u32,
}

impl Setup {
    pub fn startpos() -> Setup {
        use PieceType as Pt;
        let back = [Pt::ROOK, Pt::KNIGHT, Pt::BISHOP, Pt::QUEEN, Pt::KING, Pt::BISHOP, Pt::KNIGHT, Pt::ROOK];
        let mut board = [Piece::NONE; 64];
        for (f, &pt) in back.iter().enumerate() {
            let f = f as u8;
            board[Square::new(f, RANK_1).index()] = Piece::make(Color::White, pt);
            board[Square::new(f, RANK_2).index()] = Piece::make(Color::White, Pt::PAWN);
            board[Square::new(f, RANK_7).index()] = Piece::make(Color::Black, Pt::PAWN);
            board[Square::new(f, RANK_8).index()] = Piece::make(Color::Black, pt);
        }
        Setup {
            board,
            side_to_move: Color::White,
            castling: vec![Square::H1, Square::A1, Square::H8, Square::A8],
            ep_square: None,
            rule50: 0,
            fullmove: 1,
        }
    }

    #[inline]
    pub fn piece_on(&self, s: Square) -> Piece { self.board[s.index()] }

    fn count(&self, pc: Piece) -> usize { self.board.iter().filter(|&&p| p == pc).count() }

    fn king(&self, c: Color) -> Option<Square> {
        let k = Piece::make(c, PieceType::KING);
        Square::all().find(|&s| self.piece_on(s) == k)
    }

    /// Outermost rook of `c` on its back rank, on the king or queen side.
    fn outer_rook(&self, c: Color, king_side: bool) -> Option<Square> {
        let rook = Piece::make(c, PieceType::ROOK);
        let rank = RANK_1 ^ (c as u8 * 7);
        let mut files: Vec<u8> = (0..8).collect();
        if king_side {
            files.reverse();
        }
        let ksq = self.king(c);
        files
            .into_iter()
            .map(|f| Square::new(f, rank))
            .take_while(|&s| Some(s) != ksq)
            .find(|&s| self.piece_on(s) == rook)
    }

    /// Checks that need no attack computation.
    pub fn validate(&self) -> Result<(), SetupError> {
        use PieceType as Pt;
        for c in Color::BOTH {
            let kings = self.count(Piece::make(c, Pt::KING));
            if kings != 1 {
                return Err(SetupError::KingCount { color: c, count: kings });
            }
            let total: usize = PieceType::EACH.iter().map(|&pt| self.count(Piece::make(c, pt))).sum();
            if total > 16 {
                return Err(SetupError::TooManyPieces(c));
            }
            if self.count(Piece::make(c, Pt::PAWN)) > 8 {
                return Err(SetupError::TooManyPawns(c));
            }
        }
        for s in Square::all() {
            if self.piece_on(s).piece_type() == Pt::PAWN && (s.rank() == RANK_1 || s.rank() == RANK_8) {
                return Err(SetupError::PawnOnBackRank(s));
            }
        }

        let mut seen = CastlingRights::NONE;
        for &rsq in &self.castling {
            let pc = self.piece_on(rsq);
            if pc.piece_type() != Pt::ROOK || rsq.relative_rank(pc.color()) != RANK_1 {
                return Err(SetupError::BadCastling(rsq));
            }
            let c = pc.color();
            let ksq = self.king(c).ok_or(SetupError::BadCastling(rsq))?;
            if ksq.rank() != rsq.rank() {
                return Err(SetupError::BadCastling(rsq));
            }
            let cr = CastlingRights::single(c, ksq < rsq);
            if seen.intersects(cr) {
                return Err(SetupError::BadCastling(rsq));
            }
            seen |= cr;
        }

        if let Some(ep) = self.ep_square {
            let us = self.side_to_move;
            let them = !us;
            let rank_ok = ep.relative_rank(us) == RANK_6;
            if !rank_ok
                || self.piece_on(ep.offset(pawn_push(them))) != Piece::make(them, Pt::PAWN)
                || !self.piece_on(ep).is_none()
                || !self.piece_on(ep.offset(-pawn_push(them))).is_none()
            {
                return Err(SetupError::BadEnPassant(ep));
            }
        }
        Ok(())
    }

    /// FEN text. Castling uses KQkq for outermost rooks and file letters
    /// otherwise, or file letters throughout when `shredder` is set.
    pub fn to_fen(&self, shredder: bool) -> String {
        let mut s = String::with_capacity(90);
        for r in (0..8u8).rev() {
            let mut empty = 0;
            for f in 0..8u8 {
                let pc = self.piece_on(Square::new(f, r));
                if pc.is_none() {
                    empty += 1;
                    continue;
                }
                if empty > 0 {
                    s.push(char::from(b'0' + empty));
                    empty = 0;
                }
                s.push(pc.to_char());
            }
            if empty > 0 {
                s.push(char::from(b'0' + empty));
            }
            if r > 0 {
                s.push('/');
            }
        }

        s.push_str(if self.side_to_move == Color::White { " w " } else { " b " });

        let mut rights: Vec<(CastlingRights, char)> = Vec::with_capacity(4);
        for &rsq in &self.castling {
            let c = self.piece_on(rsq).color();
            let Some(ksq) = self.king(c) else { continue };
            let king_side = ksq < rsq;
            let letter = if !shredder && self.outer_rook(c, king_side) == Some(rsq) {
                if king_side { 'K' } else { 'Q' }
            } else {
                char::from(b'A' + rsq.file())
            };
            let letter = if c == Color::White { letter } else { letter.to_ascii_lowercase() };
            rights.push((CastlingRights::single(c, king_side), letter));
        }
        rights.sort_by_key(|&(cr, _)| cr.index());
        if rights.is_empty() {
            s.push('-');
        } else {
            s.extend(rights.into_iter().map(|(_, ch)| ch));
        }

        match self.ep_square {
            Some(ep) => s.push_str(&format!(" {} ", ep)),
            None => s.push_str(" - "),
        }
        s.push_str(&format!("{} {}", self.rule50, self.fullmove));
        s
    }
}

impl fmt::Display for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.to_fen(false)) }
}

impl FromStr for Setup {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<Setup, FenError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(FenError::MissingField("piece placement"))?;
        let side = fields.next().ok_or(FenError::MissingField("side to move"))?;
        let castling = fields.next().unwrap_or("-");
        let ep = fields.next().unwrap_or("-");
        let rule50 = fields.next().unwrap_or("0");
        let fullmove = fields.next().unwrap_or("1");

        let mut board = [Piece::NONE; 64];
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::Placement(format!("expected 8 ranks, found {}", ranks.len())));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for ch in rank_str.chars() {
                if let Some(d) = ch.to_digit(10) {
                    if !(1..=8).contains(&d) {
                        return Err(FenError::Placement(format!("bad empty-square count '{}'", ch)));
                    }
                    file += d as u8;
                } else {
                    let pc = Piece::from_char(ch).ok_or_else(|| FenError::Placement(format!("unknown piece '{}'", ch)))?;
                    if file >= 8 {
                        return Err(FenError::Placement(format!("rank {} is too long", rank + 1)));
                    }
                    board[Square::new(file, rank).index()] = pc;
                    file += 1;
                }
                if file > 8 {
                    return Err(FenError::Placement(format!("rank {} is too long", rank + 1)));
                }
            }
            if file != 8 {
                return Err(FenError::Placement(format!("rank {} has {} squares", rank + 1, file)));
            }
        }

        let side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(FenError::SideToMove(side.to_string())),
        };

        let mut setup = Setup { board, side_to_move, castling: Vec::new(), ep_square: None, rule50: 0, fullmove: 1 };

        if castling != "-" {
            for ch in castling.chars() {
                let c = if ch.is_ascii_uppercase() { Color::White } else { Color::Black };
                let rsq = match ch.to_ascii_uppercase() {
                    'K' => setup.outer_rook(c, true),
                    'Q' => setup.outer_rook(c, false),
                    f @ 'A'..='H' => Some(Square::new(f as u8 - b'A', RANK_1 ^ (c as u8 * 7))),
                    _ => None,
                };
                let rsq = rsq.ok_or_else(|| FenError::Castling(castling.to_string()))?;
                if !setup.castling.contains(&rsq) {
                    setup.castling.push(rsq);
                }
            }
        }

        if ep != "-" {
            let sq = Square::parse(ep).ok_or_else(|| FenError::EnPassant(ep.to_string()))?;
            setup.ep_square = Some(sq);
        }

        setup.rule50 = rule50.parse().map_err(|_| FenError::Counter(rule50.to_string()))?;
        setup.fullmove = fullmove.parse().map_err(|_| FenError::Counter(fullmove.to_string()))?;
        Ok(setup)
    }
}

impl TryFrom<String> for Setup {
    type Error = FenError;
    fn try_from(s: String) -> Result<Setup, FenError> { s.parse() }
}

impl From<Setup> for String {
    fn from(s: Setup) -> String { s.to_fen(false) }
}

impl Position {
    pub fn from_fen(fen: &str) -> Result<Position, SetupError> { Self::from_fen_960(fen, false) }

    pub fn from_fen_960(fen: &str, chess960: bool) -> Result<Position, SetupError> {
        let mut pos = Position::new();
        pos.set_fen(fen, chess960)?;
        Ok(pos)
    }
}

impl<O: PieceObserver> Position<O> {
    /// Re-initialises the position in place. On error the position is left
    /// in an unspecified but memory-safe state and must be set again.
    pub fn set(&mut self, setup: &Setup, chess960: bool) -> Result<(), SetupError> {
        setup.validate()?;
        self.load(setup, chess960);

        let us = self.side_to_move;
        if (self.attackers_to(self.king_square(!us)) & self.pieces_c(us)).any() {
            return Err(SetupError::OpponentInCheck);
        }
        let checkers = self.checkers().popcount();
        if checkers > 2 {
            return Err(SetupError::TooManyCheckers(checkers));
        }
        log::debug!("position set: {}", self.fen());
        Ok(())
    }

    pub fn set_fen(&mut self, fen: &str, chess960: bool) -> Result<(), SetupError> {
        let setup: Setup = fen.parse()?;
        self.set(&setup, chess960)
    }
}

impl<O> Position<O> {
    pub fn to_setup(&self) -> Setup {
        let mut board = [Piece::NONE; 64];
        for s in self.pieces() {
            board[s.index()] = self.piece_on(s);
        }
        let castling = CastlingRights::EACH
            .into_iter()
            .filter(|&cr| self.can_castle(cr))
            .map(|cr| self.castling_rook_square(cr))
            .collect();
        Setup {
            board,
            side_to_move: self.side_to_move,
            castling,
            ep_square: self.ep_square(),
            rule50: self.rule50_count().max(0) as u32,
            fullmove: (1 + (self.game_ply - (self.side_to_move == Color::Black) as i32) / 2).max(1) as u32,
        }
    }

    pub fn fen(&self) -> String { self.to_setup().to_fen(self.chess960) }

    /// Resolves UCI text (either castling notation) to a legal move.
    pub fn parse_uci_move(&self, uci: &str) -> Option<Move> {
        let uci = uci.trim().to_ascii_lowercase();
        movegen::legal_moves(self)
            .into_iter()
            .find(|m| m.to_uci(self.chess960) == uci || m.to_uci(true) == uci)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " +---+---+---+---+---+---+---+---+")?;
        for r in (0..8u8).rev() {
            for file in 0..8u8 {
                let pc = self.piece_on(Square::new(file, r));
                write!(f, " | {}", if pc.is_none() { ' ' } else { pc.to_char() })?;
            }
            writeln!(f, " | {}", r + 1)?;
            writeln!(f, " +---+---+---+---+---+---+---+---+")?;
        }
        writeln!(f, "   a   b   c   d   e   f   g   h")?;
        writeln!(f)?;
        writeln!(f, "Fen: {}", self.fen())?;
        write!(f, "Key: {:016X}", self.key())
    }
}
