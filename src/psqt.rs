use crate::types::*;
use std::sync::OnceLock;

static PSQ: OnceLock<[[Score; 64]; Piece::NB]> = OnceLock::new();

// Positional part, white's point of view.
fn bonus(pt: PieceType, s: Square) -> Score {
    let (f, r) = (s.file() as Value, s.rank() as Value);
    let centre = f.min(7 - f) + r.min(7 - r);
    match pt {
        PieceType::PAWN => {
            let central = if (3..=4).contains(&f) { 8 } else { 0 };
            Score::new(3 * (r - 1) + central * (r - 1).min(2), 9 * (r - 1))
        }
        PieceType::KNIGHT => Score::new(11 * centre - 35, 9 * centre - 28),
        PieceType::BISHOP => Score::new(5 * centre - 12, 6 * centre - 15),
        PieceType::ROOK => Score::new(if r == RANK_7 as Value { 18 } else { 2 * f.min(7 - f) }, 2 * centre - 4),
        PieceType::QUEEN => Score::new(2 * centre - 6, 5 * centre - 14),
        PieceType::KING => Score::new(-25 * r.min(3) + 5 * (3 - f.min(7 - f)), 14 * centre - 40),
        _ => Score::ZERO,
    }
}

fn table() -> &'static [[Score; 64]; Piece::NB] {
    PSQ.get_or_init(|| {
        let mut t = [[Score::ZERO; 64]; Piece::NB];
        for pt in PieceType::EACH {
            let value = Score::new(piece_value_mg(pt), piece_value_eg(pt));
            let white = Piece::make(Color::White, pt);
            let black = Piece::make(Color::Black, pt);
            for s in Square::all() {
                let sc = value + bonus(pt, s);
                t[white.index()][s.index()] = sc;
                t[black.index()][s.flip_rank().index()] = -sc;
            }
        }
        t
    })
}

/// Material plus placement bonus of `pc` on `s`, from white's point of view.
#[inline]
pub fn psq(pc: Piece, s: Square) -> Score { table()[pc.index()][s.index()] }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_entries_mirror_white() {
        let wn = Piece::make(Color::White, PieceType::KNIGHT);
        let bn = Piece::make(Color::Black, PieceType::KNIGHT);
        assert_eq!(psq(wn, Square::F3), -psq(bn, Square::F6));
        assert!(psq(wn, Square::D4).mg > psq(wn, Square::A1).mg);
        assert_eq!(psq(Piece::NONE, Square::E4), Score::ZERO);
    }
}
