//! Bitboard primitives and attack tables.
//!
//! A bitboard is a 64-bit set with bit `i` standing for square `i` (a1 = 0).
//! Leaper attacks are precomputed at compile time; slider attacks use
//! per-direction rays cut at the first blocker (found with lsb/msb).

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use super::types::{Color, Square};

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bitboard(pub u64);

pub const FILE_A: Bitboard = Bitboard(0x0101_0101_0101_0101);
pub const FILE_H: Bitboard = Bitboard(0x8080_8080_8080_8080);
pub const RANK_1: Bitboard = Bitboard(0x0000_0000_0000_00FF);
pub const RANK_8: Bitboard = Bitboard(0xFF00_0000_0000_0000);

const NOT_FILE_A: u64 = !FILE_A.0;
const NOT_FILE_H: u64 = !FILE_H.0;
const NOT_FILE_AB: u64 = !(FILE_A.0 | (FILE_A.0 << 1));
const NOT_FILE_GH: u64 = !(FILE_H.0 | (FILE_H.0 >> 1));

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const FULL: Bitboard = Bitboard(!0);

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn any(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn more_than_one(self) -> bool {
        self.0 & self.0.wrapping_sub(1) != 0
    }

    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        self.0 & (1u64 << sq.index()) != 0
    }

    /// Least significant set square. The board must not be empty.
    #[inline]
    pub const fn lsb(self) -> Square {
        debug_assert!(self.0 != 0);
        Square::from_index(self.0.trailing_zeros() as u8)
    }

    /// Most significant set square. The board must not be empty.
    #[inline]
    pub const fn msb(self) -> Square {
        debug_assert!(self.0 != 0);
        Square::from_index(63 - self.0.leading_zeros() as u8)
    }

    #[inline]
    pub fn pop_lsb(&mut self) -> Square {
        let sq = self.lsb();
        self.0 &= self.0 - 1;
        sq
    }
}

impl Iterator for Bitboard {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        if self.is_empty() { None } else { Some(self.pop_lsb()) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.count() as usize;
        (n, Some(n))
    }
}

macro_rules! bit_op {
    ($trait:ident, $fn:ident, $assign_trait:ident, $assign_fn:ident, $op:tt) => {
        impl $trait for Bitboard {
            type Output = Bitboard;
            #[inline]
            fn $fn(self, rhs: Bitboard) -> Bitboard {
                Bitboard(self.0 $op rhs.0)
            }
        }
        impl $assign_trait for Bitboard {
            #[inline]
            fn $assign_fn(&mut self, rhs: Bitboard) {
                self.0 = self.0 $op rhs.0;
            }
        }
    };
}

bit_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
bit_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
bit_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl Not for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn not(self) -> Bitboard {
        Bitboard(!self.0)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitboard({:#018x})", self.0)?;
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                let c = if self.contains(Square::new(file, rank)) { 'x' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

static KNIGHT_ATTACKS: [u64; 64] = init_knight_attacks();
static KING_ATTACKS: [u64; 64] = init_king_attacks();
static PAWN_ATTACKS: [[u64; 64]; 2] = init_pawn_attacks();

// Ray directions: N, NE, E, SE, S, SW, W, NW.
const DIRS: [(i32, i32); 8] = [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)];
const POSITIVE: [bool; 8] = [true, true, true, false, false, false, false, true];
const ROOK_DIRS: [usize; 4] = [0, 2, 4, 6];
const BISHOP_DIRS: [usize; 4] = [1, 3, 5, 7];
static RAYS: [[u64; 64]; 8] = init_rays();

const fn init_knight_attacks() -> [u64; 64] {
    let mut attacks = [0u64; 64];
    let mut sq = 0usize;
    while sq < 64 {
        let bb = 1u64 << sq;
        let mut a = 0u64;
        a |= (bb << 17) & NOT_FILE_A;
        a |= (bb << 15) & NOT_FILE_H;
        a |= (bb << 10) & NOT_FILE_AB;
        a |= (bb << 6) & NOT_FILE_GH;
        a |= (bb >> 15) & NOT_FILE_A;
        a |= (bb >> 17) & NOT_FILE_H;
        a |= (bb >> 6) & NOT_FILE_AB;
        a |= (bb >> 10) & NOT_FILE_GH;
        attacks[sq] = a;
        sq += 1;
    }
    attacks
}

const fn init_king_attacks() -> [u64; 64] {
    let mut attacks = [0u64; 64];
    let mut sq = 0usize;
    while sq < 64 {
        let bb = 1u64 << sq;
        let mut a = (bb << 8) | (bb >> 8);
        a |= ((bb << 1) | (bb << 9) | (bb >> 7)) & NOT_FILE_A;
        a |= ((bb >> 1) | (bb >> 9) | (bb << 7)) & NOT_FILE_H;
        attacks[sq] = a;
        sq += 1;
    }
    attacks
}

const fn init_pawn_attacks() -> [[u64; 64]; 2] {
    let mut attacks = [[0u64; 64]; 2];
    let mut sq = 0usize;
    while sq < 64 {
        let bb = 1u64 << sq;
        attacks[0][sq] = ((bb << 7) & NOT_FILE_H) | ((bb << 9) & NOT_FILE_A);
        attacks[1][sq] = ((bb >> 9) & NOT_FILE_H) | ((bb >> 7) & NOT_FILE_A);
        sq += 1;
    }
    attacks
}

const fn init_rays() -> [[u64; 64]; 8] {
    let mut rays = [[0u64; 64]; 8];
    let mut dir = 0usize;
    while dir < 8 {
        let (df, dr) = DIRS[dir];
        let mut sq = 0usize;
        while sq < 64 {
            let mut f = (sq % 8) as i32 + df;
            let mut r = (sq / 8) as i32 + dr;
            let mut ray = 0u64;
            while f >= 0 && f < 8 && r >= 0 && r < 8 {
                ray |= 1u64 << (r * 8 + f);
                f += df;
                r += dr;
            }
            rays[dir][sq] = ray;
            sq += 1;
        }
        dir += 1;
    }
    rays
}

#[inline]
fn ray_attacks(dir: usize, sq: Square, occupied: Bitboard) -> u64 {
    let ray = RAYS[dir][sq.index()];
    let blockers = ray & occupied.0;
    if blockers == 0 {
        return ray;
    }
    let first = if POSITIVE[dir] { blockers.trailing_zeros() } else { 63 - blockers.leading_zeros() };
    ray ^ RAYS[dir][first as usize]
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    Bitboard(KNIGHT_ATTACKS[sq.index()])
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    Bitboard(KING_ATTACKS[sq.index()])
}

/// Squares attacked by a pawn of `color` standing on `sq`.
#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    Bitboard(PAWN_ATTACKS[color.index()][sq.index()])
}

#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let mut a = 0u64;
    for dir in ROOK_DIRS {
        a |= ray_attacks(dir, sq, occupied);
    }
    Bitboard(a)
}

#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let mut a = 0u64;
    for dir in BISHOP_DIRS {
        a |= ray_attacks(dir, sq, occupied);
    }
    Bitboard(a)
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    #[test]
    fn leaper_counts() {
        assert_eq!(knight_attacks(sq("a1")).count(), 2);
        assert_eq!(knight_attacks(sq("d4")).count(), 8);
        assert_eq!(king_attacks(sq("h8")).count(), 3);
        assert_eq!(king_attacks(sq("e4")).count(), 8);
        assert_eq!(pawn_attacks(Color::White, sq("a2")), sq("b3").bb());
        assert_eq!(pawn_attacks(Color::Black, sq("h7")), sq("g6").bb());
    }

    #[test]
    fn sliders_stop_at_blockers() {
        let occ = sq("d6").bb() | sq("f4").bb();
        let r = rook_attacks(sq("d4"), occ);
        assert!(r.contains(sq("d6")));
        assert!(!r.contains(sq("d7")));
        assert!(r.contains(sq("f4")));
        assert!(!r.contains(sq("g4")));
        assert!(r.contains(sq("d1")));
        assert!(r.contains(sq("a4")));
        assert_eq!(bishop_attacks(sq("a1"), Bitboard::EMPTY).count(), 7);
        assert_eq!(queen_attacks(sq("d4"), Bitboard::EMPTY).count(), 27);
    }

    #[test]
    fn lsb_msb_and_iteration() {
        let bb = sq("c3").bb() | sq("g7").bb();
        assert_eq!(bb.lsb(), sq("c3"));
        assert_eq!(bb.msb(), sq("g7"));
        assert!(bb.more_than_one());
        let squares: Vec<Square> = bb.collect();
        assert_eq!(squares, vec![sq("c3"), sq("g7")]);
    }
}
