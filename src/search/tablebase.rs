//! Endgame-table probing hook. No table format ships with the crate; a
//! backend is injected through [`EndgameProbe`].

use crate::board::Position;
use crate::search::eval::{DRAW_SCORE, MAX_PLY, TB_WIN_SCORE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TbOutcome {
    Win,
    Draw,
    Loss,
}

/// Result for the side to move; `distance` is plies to conversion when known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TbProbe {
    pub outcome: TbOutcome,
    pub distance: Option<u32>,
}

pub trait EndgameProbe: Send + Sync {
    /// Largest piece count (kings included) the backend can answer.
    fn max_pieces(&self) -> u32;

    fn probe(&self, pos: &Position) -> Option<TbProbe>;
}

impl TbProbe {
    /// Search score at `ply`. Shorter wins score higher. The distance is
    /// capped at `MAX_PLY` so the score stays in the band the TT ply-adjusts.
    pub fn to_score(self, ply: usize) -> i32 {
        let dist = (self.distance.unwrap_or(0) as usize).saturating_add(ply).min(MAX_PLY) as i32;
        match self.outcome {
            TbOutcome::Win => TB_WIN_SCORE - dist,
            TbOutcome::Loss => -TB_WIN_SCORE + dist,
            TbOutcome::Draw => DRAW_SCORE,
        }
    }
}

/// Probes only when the position is small enough and not at the root.
pub(crate) fn probe_if_eligible(tb: Option<&dyn EndgameProbe>, pos: &Position, ply: usize) -> Option<TbProbe> {
    let tb = tb?;
    if ply == 0 || pos.piece_count() > tb.max_pieces() || pos.castling().bits() != 0 {
        return None;
    }
    tb.probe(pos)
}
