use std::fmt;
use std::ops::{Deref, DerefMut};

use super::types::{Piece, Square};

/// Packed move: from (0-5), to (6-11), promotion piece + 1 (12-14), flags above.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Move(u32);

impl Move {
    pub const NULL: Move = Move(0);

    pub const CAPTURE: u32 = 1 << 15;
    pub const CASTLE: u32 = 1 << 16;
    pub const EN_PASSANT: u32 = 1 << 17;
    pub const DOUBLE_PUSH: u32 = 1 << 18;

    /// Number of significant bits in `raw()`.
    pub const BITS: u32 = 19;

    #[inline]
    pub const fn new(from: Square, to: Square, promo: Option<Piece>, flags: u32) -> Move {
        let p = match promo {
            Some(p) => p as u32 + 1,
            None => 0,
        };
        Move(from.index() as u32 | (to.index() as u32) << 6 | p << 12 | flags)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Move {
        Move(raw & ((1 << Self::BITS) - 1))
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn from(self) -> Square {
        Square::from_index((self.0 & 63) as u8)
    }

    #[inline]
    pub const fn to(self) -> Square {
        Square::from_index(((self.0 >> 6) & 63) as u8)
    }

    #[inline]
    pub const fn promotion(self) -> Option<Piece> {
        let p = (self.0 >> 12) & 7;
        if p == 0 { None } else { Piece::from_index(p as usize - 1) }
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.0 & Self::CAPTURE != 0
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        self.0 & Self::CASTLE != 0
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        self.0 & Self::EN_PASSANT != 0
    }

    #[inline]
    pub const fn is_double_push(self) -> bool {
        self.0 & Self::DOUBLE_PUSH != 0
    }

    /// Captures and promotions.
    #[inline]
    pub const fn is_tactical(self) -> bool {
        self.is_capture() || self.promotion().is_some()
    }

    /// Same squares and promotion, ignoring flags. Used to match parsed UCI text against generated moves.
    #[inline]
    pub fn same_squares(self, other: Move) -> bool {
        self.0 & 0x7FFF == other.0 & 0x7FFF
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("0000");
        }
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(p) = self.promotion() {
            write!(f, "{}", p.to_char(super::types::Color::Black))?;
        }
        Ok(())
    }
}

pub const MAX_MOVES: usize = 256;

/// Fixed-capacity move buffer; no allocation during search.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    #[inline]
    pub fn new() -> Self {
        MoveList { moves: [Move::NULL; MAX_MOVES], len: 0 }
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES);
        self.moves[self.len] = mv;
        self.len += 1;
    }

    /// Keeps moves for which `keep` returns true, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(Move) -> bool) {
        let mut w = 0;
        for r in 0..self.len {
            let mv = self.moves[r];
            if keep(mv) {
                self.moves[w] = mv;
                w += 1;
            }
        }
        self.len = w;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for MoveList {
    type Target = [Move];

    #[inline]
    fn deref(&self) -> &[Move] {
        &self.moves[..self.len]
    }
}

impl DerefMut for MoveList {
    #[inline]
    fn deref_mut(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|m| m.to_string())).finish()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_fields_and_prints_uci() {
        let from = Square::parse("e7").unwrap();
        let to = Square::parse("d8").unwrap();
        let m = Move::new(from, to, Some(Piece::Knight), Move::CAPTURE);
        assert_eq!(m.from(), from);
        assert_eq!(m.to(), to);
        assert_eq!(m.promotion(), Some(Piece::Knight));
        assert!(m.is_capture() && !m.is_castle());
        assert_eq!(m.to_string(), "e7d8n");
        assert_eq!(Move::from_raw(m.raw()), m);
        assert!(m.same_squares(Move::new(from, to, Some(Piece::Knight), 0)));
        assert_eq!(Move::NULL.to_string(), "0000");
    }
}
