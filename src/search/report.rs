use std::fmt;
use std::time::Duration;

use log::info;

use crate::board::Move;
use crate::search::eval::{MATE_IN_MAX, MATE_SCORE};

/// Score as reported to the outside: centipawns, or moves to mate
/// (positive when the side to move mates).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Score {
    Cp(i32),
    Mate(i32),
}

impl Score {
    pub fn from_internal(score: i32) -> Score {
        if score >= MATE_IN_MAX {
            let plies = MATE_SCORE - score;
            Score::Mate((plies + 1) / 2)
        } else if score <= -MATE_IN_MAX {
            let plies = MATE_SCORE + score;
            Score::Mate(-(plies / 2))
        } else {
            Score::Cp(score)
        }
    }

    pub fn is_mate(self) -> bool {
        matches!(self, Score::Mate(_))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Cp(cp) => write!(f, "cp {cp}"),
            Score::Mate(n) => write!(f, "mate {n}"),
        }
    }
}

/// Progress after a completed iteration of the main worker.
#[derive(Clone, Debug)]
pub struct SearchInfo {
    pub depth: u32,
    pub seldepth: u32,
    pub score: Score,
    pub nodes: u64,
    pub nps: u64,
    pub elapsed: Duration,
    pub hashfull: u32,
    pub pv: Vec<Move>,
}

impl fmt::Display for SearchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "depth {} seldepth {} score {} nodes {} nps {} hashfull {} time {}",
            self.depth,
            self.seldepth,
            self.score,
            self.nodes,
            self.nps,
            self.hashfull,
            self.elapsed.as_millis()
        )?;
        if !self.pv.is_empty() {
            f.write_str(" pv")?;
            for mv in &self.pv {
                write!(f, " {mv}")?;
            }
        }
        Ok(())
    }
}

/// Final answer of a search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// `None` only when the root has no legal moves.
    pub best_move: Option<Move>,
    pub ponder: Option<Move>,
    pub score: Score,
    /// Internal score for the side to move.
    pub raw_score: i32,
    /// Deepest completed iteration of the selected worker (0 if none).
    pub depth: u32,
    pub seldepth: u32,
    pub nodes: u64,
    pub pv: Vec<Move>,
    /// Index of the worker whose result was selected.
    pub worker: usize,
    pub elapsed: Duration,
}

/// Sink for progress reports. Called from the main worker's thread.
pub trait Reporter: Send + Sync {
    fn on_iteration(&self, info: &SearchInfo);

    fn on_finish(&self, _outcome: &SearchOutcome) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn on_iteration(&self, _info: &SearchInfo) {}
}

/// Logs each iteration at info level, in the `info ...` line format.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn on_iteration(&self, info: &SearchInfo) {
        info!("info {info}");
    }

    fn on_finish(&self, outcome: &SearchOutcome) {
        match outcome.best_move {
            Some(mv) => info!("bestmove {mv} ({}, depth {}, worker {})", outcome.score, outcome.depth, outcome.worker),
            None => info!("bestmove (none) ({})", outcome.score),
        }
    }
}

impl<F> Reporter for F
where
    F: Fn(&SearchInfo) + Send + Sync,
{
    fn on_iteration(&self, info: &SearchInfo) {
        self(info)
    }
}
