use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::Move;

/// Budget for one search. Unset fields are unbounded; with everything unset
/// the search runs to `MAX_DEPTH` or until stopped externally.
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub movetime: Option<Duration>,
    /// Absolute wall-clock deadline supplied by a time manager.
    pub deadline: Option<Instant>,
    /// Restricts the root to these moves when non-empty.
    pub searchmoves: Vec<Move>,
}

impl SearchLimits {
    pub fn depth(depth: u32) -> Self {
        SearchLimits { depth: Some(depth), ..Default::default() }
    }

    pub fn nodes(nodes: u64) -> Self {
        SearchLimits { nodes: Some(nodes), ..Default::default() }
    }

    pub fn movetime(movetime: Duration) -> Self {
        SearchLimits { movetime: Some(movetime), ..Default::default() }
    }

    /// Earliest of the explicit deadline and `start + movetime - overhead`.
    pub fn effective_deadline(&self, start: Instant, overhead: Duration) -> Option<Instant> {
        let from_movetime = self.movetime.map(|mt| start + mt.saturating_sub(overhead));
        match (from_movetime, self.deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Shared cancellation flag. Cloning shares the same flag.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_takes_the_earlier_bound() {
        let start = Instant::now();
        let mut limits = SearchLimits::movetime(Duration::from_millis(500));
        let overhead = Duration::from_millis(20);
        assert_eq!(limits.effective_deadline(start, overhead), Some(start + Duration::from_millis(480)));
        limits.deadline = Some(start + Duration::from_millis(100));
        assert_eq!(limits.effective_deadline(start, overhead), Some(start + Duration::from_millis(100)));
        assert_eq!(SearchLimits::depth(3).effective_deadline(start, overhead), None);
    }

    #[test]
    fn stop_signal_is_shared_between_clones() {
        let a = StopSignal::new();
        let b = a.clone();
        b.stop();
        assert!(a.is_stopped());
        a.reset();
        assert!(!b.is_stopped());
    }
}
