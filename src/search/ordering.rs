//! Move ordering: hash move, SEE-sorted captures, killers, history.

use crate::board::moves::MAX_MOVES;
use crate::board::{generate_legal, generate_tactical, Color, Move, MoveList, Piece, Position};
use crate::search::eval::MAX_PLY;
use crate::search::see::see;

pub const HASH_MOVE_SCORE: i32 = 1_000_000;
pub const GOOD_CAPTURE_SCORE: i32 = 500_000;
pub const QUEEN_PROMO_SCORE: i32 = 400_000;
pub const KILLER_1_SCORE: i32 = 300_000;
pub const KILLER_2_SCORE: i32 = 299_000;
pub const BAD_CAPTURE_SCORE: i32 = -100_000;
pub const HISTORY_MAX: i32 = 16_384;

/// Butterfly history indexed by side, from and to square.
pub struct History {
    table: Box<[[[i32; 64]; 64]; 2]>,
}

impl Default for History {
    fn default() -> Self {
        History { table: Box::new([[[0; 64]; 64]; 2]) }
    }
}

impl History {
    #[inline]
    pub fn get(&self, side: Color, mv: Move) -> i32 {
        self.table[side.index()][mv.from().index()][mv.to().index()]
    }

    /// Gravity update: entries saturate towards `±HISTORY_MAX`.
    #[inline]
    pub fn update(&mut self, side: Color, mv: Move, bonus: i32) {
        let bonus = bonus.clamp(-HISTORY_MAX, HISTORY_MAX);
        let h = &mut self.table[side.index()][mv.from().index()][mv.to().index()];
        *h += bonus - *h * bonus.abs() / HISTORY_MAX;
    }

    pub fn clear(&mut self) {
        for side in self.table.iter_mut() {
            for row in side.iter_mut() {
                row.fill(0);
            }
        }
    }
}

#[inline]
pub fn history_bonus(depth: u32) -> i32 {
    let d = depth.min(16) as i32;
    d * d * 16
}

pub struct Killers {
    slots: Vec<[Move; 2]>,
}

impl Default for Killers {
    fn default() -> Self {
        Killers { slots: vec![[Move::NULL; 2]; MAX_PLY + 1] }
    }
}

impl Killers {
    #[inline]
    pub fn get(&self, ply: usize) -> [Move; 2] {
        self.slots.get(ply).copied().unwrap_or([Move::NULL; 2])
    }

    pub fn store(&mut self, ply: usize, mv: Move) {
        if let Some(slot) = self.slots.get_mut(ply) {
            if slot[0] != mv {
                slot[1] = slot[0];
                slot[0] = mv;
            }
        }
    }

    /// Clears the slots of `ply` (children of the current node start fresh).
    #[inline]
    pub fn clear_ply(&mut self, ply: usize) {
        if let Some(slot) = self.slots.get_mut(ply) {
            *slot = [Move::NULL; 2];
        }
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = [Move::NULL; 2]);
    }
}

/// Legal moves with ordering scores, handed out best first by lazy selection.
pub struct MovePicker {
    moves: MoveList,
    scores: [i32; MAX_MOVES],
    next: usize,
}

impl MovePicker {
    /// All legal moves ordered for a main-search node.
    pub fn new(pos: &Position, hash_move: Option<Move>, killers: [Move; 2], history: &History) -> Self {
        let moves = generate_legal(pos);
        let side = pos.side_to_move();
        let mut scores = [0i32; MAX_MOVES];
        for (i, &mv) in moves.iter().enumerate() {
            scores[i] = if Some(mv) == hash_move {
                HASH_MOVE_SCORE
            } else if mv.is_capture() {
                capture_score(pos, mv)
            } else if mv.promotion() == Some(Piece::Queen) {
                QUEEN_PROMO_SCORE
            } else if mv == killers[0] {
                KILLER_1_SCORE
            } else if mv == killers[1] {
                KILLER_2_SCORE
            } else {
                history.get(side, mv)
            };
        }
        MovePicker { moves, scores, next: 0 }
    }

    /// Quiescence moves: every evasion when in check, otherwise tactical
    /// moves only.
    pub fn new_quiescence(pos: &Position, in_check: bool, hash_move: Option<Move>, history: &History) -> Self {
        if in_check {
            return Self::new(pos, hash_move, [Move::NULL; 2], history);
        }
        let moves = generate_tactical(pos);
        let mut scores = [0i32; MAX_MOVES];
        for (i, &mv) in moves.iter().enumerate() {
            scores[i] = if Some(mv) == hash_move {
                HASH_MOVE_SCORE
            } else if mv.is_capture() {
                capture_score(pos, mv)
            } else {
                QUEEN_PROMO_SCORE
            };
        }
        MovePicker { moves, scores, next: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Next best remaining move and its ordering score.
    pub fn next(&mut self) -> Option<(Move, i32)> {
        if self.next >= self.moves.len() {
            return None;
        }
        let mut best = self.next;
        for i in self.next + 1..self.moves.len() {
            if self.scores[i] > self.scores[best] {
                best = i;
            }
        }
        self.moves.swap(self.next, best);
        self.scores.swap(self.next, best);
        let out = (self.moves[self.next], self.scores[self.next]);
        self.next += 1;
        Some(out)
    }
}

#[inline]
fn capture_score(pos: &Position, mv: Move) -> i32 {
    let s = see(pos, mv);
    if s >= 0 { GOOD_CAPTURE_SCORE + s } else { BAD_CAPTURE_SCORE + s }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_move_then_good_capture_then_killer() {
        let pos = Position::from_fen("4k3/8/8/3n4/8/8/8/3RK2R w K - 0 1").unwrap();
        let hash = pos.parse_uci_move("h1h7").unwrap();
        let killer = pos.parse_uci_move("e1g1").unwrap();
        let history = History::default();
        let mut picker = MovePicker::new(&pos, Some(hash), [killer, Move::NULL], &history);
        let order: Vec<String> = std::iter::from_fn(|| picker.next()).map(|(m, _)| m.to_string()).take(3).collect();
        assert_eq!(order, vec!["h1h7", "d1d5", "e1g1"]);
    }

    #[test]
    fn history_gravity_saturates() {
        let pos = Position::startpos();
        let mv = pos.parse_uci_move("e2e4").unwrap();
        let mut h = History::default();
        for _ in 0..1000 {
            h.update(Color::White, mv, history_bonus(20));
        }
        let v = h.get(Color::White, mv);
        assert!(v > 0 && v <= HISTORY_MAX, "history {v}");
        h.clear();
        assert_eq!(h.get(Color::White, mv), 0);
    }

    #[test]
    fn killers_shift() {
        let pos = Position::startpos();
        let a = pos.parse_uci_move("e2e4").unwrap();
        let b = pos.parse_uci_move("d2d4").unwrap();
        let mut k = Killers::default();
        k.store(3, a);
        k.store(3, b);
        k.store(3, b);
        assert_eq!(k.get(3), [b, a]);
        assert_eq!(k.get(MAX_PLY + 10), [Move::NULL; 2]);
    }
}
