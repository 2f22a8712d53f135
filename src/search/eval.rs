use crate::board::{Color, Piece, Position, Square};

const PAWN: i32 = 100;
const KNIGHT: i32 = 320;
const BISHOP: i32 = 330;
const ROOK: i32 = 500;
const QUEEN: i32 = 900;

pub const PIECE_VALUES: [i32; 6] = [PAWN, KNIGHT, BISHOP, ROOK, QUEEN, 0];

// Mate scoring helpers
pub const MATE_SCORE: i32 = 30_000;
pub const DRAW_SCORE: i32 = 0;
pub const INFINITY: i32 = 31_000;
pub const MAX_PLY: usize = 128;
pub const MAX_DEPTH: u32 = 100;
/// Scores at or beyond this magnitude encode a forced mate.
pub const MATE_IN_MAX: i32 = MATE_SCORE - MAX_PLY as i32;
/// Tablebase wins sit below every mate score and above every static score.
pub const TB_WIN_SCORE: i32 = MATE_IN_MAX - MAX_PLY as i32;

#[inline]
pub fn mated_in(ply: usize) -> i32 {
    -MATE_SCORE + ply as i32
}

#[inline]
pub fn mate_in(ply: usize) -> i32 {
    MATE_SCORE - ply as i32
}

#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_IN_MAX
}

/// Static evaluation backend. Scores are centipawns from the side to move's
/// point of view and must stay well inside `±TB_WIN_SCORE`.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, pos: &Position) -> i32;
}

impl<F> Evaluator for F
where
    F: Fn(&Position) -> i32 + Send + Sync,
{
    fn evaluate(&self, pos: &Position) -> i32 {
        self(pos)
    }
}

// Side-agnostic material in centipawns: positive means White has more material.
pub fn material_cp_side_agnostic(pos: &Position) -> i32 {
    let mut score = 0;
    for piece in Piece::ALL {
        let w = pos.pieces(Color::White, piece).count() as i32;
        let b = pos.pieces(Color::Black, piece).count() as i32;
        score += (w - b) * PIECE_VALUES[piece.index()];
    }
    score
}

/// Plain material count.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialEval;

impl Evaluator for MaterialEval {
    fn evaluate(&self, pos: &Position) -> i32 {
        let base = material_cp_side_agnostic(pos);
        if pos.side_to_move() == Color::White { base } else { -base }
    }
}

// Piece-square bonuses from White's point of view, a1 first.
#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10,-20,-20, 10, 10,  5,
     5, -5,-10,  0,  0,-10, -5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5,  5, 10, 25, 25, 10,  5,  5,
    10, 10, 20, 30, 30, 20, 10, 10,
    50, 50, 50, 50, 50, 50, 50, 50,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
     0,  0,  0,  5,  5,  0,  0,  0,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     5, 10, 10, 10, 10, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -10,  5,  5,  5,  5,  5,  0,-10,
      0,  0,  5,  5,  5,  5,  0, -5,
     -5,  0,  5,  5,  5,  5,  0, -5,
    -10,  0,  5,  5,  5,  5,  0,-10,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_PST: [i32; 64] = [
     20, 30, 10,  0,  0, 10, 30, 20,
     20, 20,  0,  0,  0,  0, 20, 20,
    -10,-20,-20,-20,-20,-20,-20,-10,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
];

// Endgame king prefers the centre.
#[rustfmt::skip]
const KING_END_PST: [i32; 64] = [
    -50,-30,-30,-30,-30,-30,-30,-50,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -50,-40,-30,-20,-20,-30,-40,-50,
];

/// Material plus piece-square tables, with the king table switching to
/// its endgame form once queens are off or material is thin.
#[derive(Clone, Copy, Debug, Default)]
pub struct PstEval;

impl PstEval {
    fn table(piece: Piece, endgame: bool) -> &'static [i32; 64] {
        match piece {
            Piece::Pawn => &PAWN_PST,
            Piece::Knight => &KNIGHT_PST,
            Piece::Bishop => &BISHOP_PST,
            Piece::Rook => &ROOK_PST,
            Piece::Queen => &QUEEN_PST,
            Piece::King if endgame => &KING_END_PST,
            Piece::King => &KING_PST,
        }
    }

    fn is_endgame(pos: &Position) -> bool {
        let queens = pos.pieces_of_type(Piece::Queen).count();
        let minors_majors = pos.pieces_of_type(Piece::Knight).count()
            + pos.pieces_of_type(Piece::Bishop).count()
            + pos.pieces_of_type(Piece::Rook).count();
        queens == 0 || minors_majors <= 2
    }
}

impl Evaluator for PstEval {
    fn evaluate(&self, pos: &Position) -> i32 {
        let endgame = Self::is_endgame(pos);
        let mut score = material_cp_side_agnostic(pos);
        for piece in Piece::ALL {
            let table = Self::table(piece, endgame);
            for sq in pos.pieces(Color::White, piece) {
                score += table[sq.index()];
            }
            for sq in pos.pieces(Color::Black, piece) {
                // Mirror vertically for Black.
                score -= table[Square::new(sq.file(), 7 - sq.rank()).index()];
            }
        }
        if pos.side_to_move() == Color::White { score } else { -score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_center_better_than_rim() {
        let center = Position::from_fen("k7/8/8/8/3N4/8/8/7K w - - 0 1").unwrap();
        let rim = Position::from_fen("k7/8/8/8/8/8/8/N6K w - - 0 1").unwrap();
        assert!(PstEval.evaluate(&center) > PstEval.evaluate(&rim));
    }

    #[test]
    fn pawn_advanced_better_than_back() {
        let advanced = Position::from_fen("k7/8/8/8/4P3/8/8/7K w - - 0 1").unwrap();
        let back = Position::from_fen("k7/8/8/8/8/8/4P3/7K w - - 0 1").unwrap();
        assert!(PstEval.evaluate(&advanced) > PstEval.evaluate(&back));
    }

    #[test]
    fn scores_are_side_to_move_relative() {
        let w = Position::from_fen("k7/8/8/8/8/8/8/1KQ5 w - - 0 1").unwrap();
        let b = Position::from_fen("k7/8/8/8/8/8/8/1KQ5 b - - 0 1").unwrap();
        assert_eq!(MaterialEval.evaluate(&w), QUEEN);
        assert_eq!(MaterialEval.evaluate(&b), -QUEEN);
        assert_eq!(PstEval.evaluate(&w), -PstEval.evaluate(&b));
    }

    #[test]
    fn mate_helpers() {
        assert!(is_mate_score(mate_in(5)));
        assert!(is_mate_score(mated_in(5)));
        assert!(!is_mate_score(TB_WIN_SCORE));
    }
}
