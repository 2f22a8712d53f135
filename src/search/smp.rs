//! Lazy-SMP thread pool.
//!
//! Every worker searches the same root independently on its own rayon
//! thread and shares only the transposition table, the node counter and the
//! stop signal. A coordinator thread drives one `broadcast` per search so
//! `start_search` can return while the workers run.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::board::Position;
use crate::error::{EngineError, Result};
use crate::search::alphabeta::{SearchContext, SearchWorker, WorkerResult};
use crate::search::config::SearchConfig;
use crate::search::eval::{Evaluator, PstEval};
use crate::search::limits::{SearchLimits, StopSignal};
use crate::search::report::{NullReporter, Reporter, Score, SearchOutcome};
use crate::search::tablebase::EndgameProbe;
use crate::search::tt::Tt;

const WORKER_STACK_BYTES: usize = 16 * 1024 * 1024;
const POLL_INTERVAL: Duration = Duration::from_millis(2);

enum WorkerMsg {
    Started,
    Done(WorkerResult),
    Panicked(usize),
}

struct ActiveSearch {
    coordinator: JoinHandle<()>,
    rx: Receiver<WorkerMsg>,
    start: Instant,
    deadline: Option<Instant>,
    threads: usize,
    done: Vec<WorkerResult>,
    panicked: bool,
}

pub struct ThreadPool {
    config: Arc<SearchConfig>,
    tt: Arc<Tt>,
    workers: Arc<Vec<Mutex<SearchWorker>>>,
    pool: Arc<rayon::ThreadPool>,
    evaluator: Arc<dyn Evaluator>,
    tablebase: Option<Arc<dyn EndgameProbe>>,
    reporter: Arc<dyn Reporter>,
    stop: StopSignal,
    nodes: Arc<AtomicU64>,
    active: Option<ActiveSearch>,
    /// Coordinator abandoned after a join timeout; the pool stays busy until it exits.
    orphan: Option<JoinHandle<()>>,
}

fn build_rayon_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .stack_size(WORKER_STACK_BYTES)
        .thread_name(|i| format!("search-{i}"))
        .build()
        .map_err(|e| EngineError::ThreadStart(e.to_string()))
}

fn build_workers(
    config: &SearchConfig,
    evaluator: &Arc<dyn Evaluator>,
    tablebase: &Option<Arc<dyn EndgameProbe>>,
) -> Vec<Mutex<SearchWorker>> {
    (0..config.threads)
        .map(|i| Mutex::new(SearchWorker::new(i, config, Arc::clone(evaluator), tablebase.clone())))
        .collect()
}

/// Deepest completed iteration wins, then the higher score, then the lower index.
pub(crate) fn select_result(results: &[WorkerResult]) -> Option<&WorkerResult> {
    results.iter().min_by(|a, b| {
        b.depth
            .cmp(&a.depth)
            .then(b.score.cmp(&a.score))
            .then(a.worker.cmp(&b.worker))
    })
}

impl ThreadPool {
    /// Pool with the built-in piece-square evaluation.
    pub fn new(config: SearchConfig) -> Result<Self> {
        Self::with_evaluator(config, Arc::new(PstEval))
    }

    pub fn with_evaluator(config: SearchConfig, evaluator: Arc<dyn Evaluator>) -> Result<Self> {
        config.validate()?;
        let tt = Tt::new(config.hash_mb)?;
        let pool = build_rayon_pool(config.threads)?;
        let workers = build_workers(&config, &evaluator, &None);
        info!("search pool ready: {} threads, {} MB hash", config.threads, config.hash_mb);
        Ok(ThreadPool {
            config: Arc::new(config),
            tt: Arc::new(tt),
            workers: Arc::new(workers),
            pool: Arc::new(pool),
            evaluator,
            tablebase: None,
            reporter: Arc::new(NullReporter),
            stop: StopSignal::new(),
            nodes: Arc::new(AtomicU64::new(0)),
            active: None,
            orphan: None,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    pub fn tt(&self) -> &Tt {
        &self.tt
    }

    /// A handle that stops the current search from any thread.
    pub fn stop_handle(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn set_reporter(&mut self, reporter: Arc<dyn Reporter>) {
        self.reporter = reporter;
    }

    pub fn is_searching(&self) -> bool {
        self.active.is_some() || self.orphan.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn ensure_idle(&mut self) -> Result<()> {
        if self.is_searching() {
            return Err(EngineError::SearchInProgress);
        }
        if let Some(h) = self.orphan.take() {
            let _ = h.join();
        }
        Ok(())
    }

    pub fn set_tablebase(&mut self, tablebase: Option<Arc<dyn EndgameProbe>>) -> Result<()> {
        self.ensure_idle()?;
        self.tablebase = tablebase;
        self.workers = Arc::new(build_workers(&self.config, &self.evaluator, &self.tablebase));
        Ok(())
    }

    pub fn set_threads(&mut self, threads: usize) -> Result<()> {
        self.ensure_idle()?;
        if threads == 0 {
            return Err(EngineError::Config("threads must be at least 1".into()));
        }
        if threads == self.workers.len() {
            return Ok(());
        }
        self.pool = Arc::new(build_rayon_pool(threads)?);
        Arc::make_mut(&mut self.config).threads = threads;
        self.workers = Arc::new(build_workers(&self.config, &self.evaluator, &self.tablebase));
        info!("search pool resized to {threads} threads");
        Ok(())
    }

    pub fn resize_tt(&mut self, mb: usize) -> Result<()> {
        self.ensure_idle()?;
        let tt = Arc::get_mut(&mut self.tt).ok_or(EngineError::SearchInProgress)?;
        tt.resize(mb)?;
        Arc::make_mut(&mut self.config).hash_mb = mb;
        info!("transposition table resized to {mb} MB");
        Ok(())
    }

    /// Forgets everything learned so far: TT contents and worker heuristics.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_idle()?;
        let tt = Arc::get_mut(&mut self.tt).ok_or(EngineError::SearchInProgress)?;
        tt.clear();
        for w in self.workers.iter() {
            w.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
        Ok(())
    }

    /// Releases all workers on `pos` and returns once every one of them
    /// has started.
    pub fn start_search(&mut self, pos: &Position, limits: SearchLimits) -> Result<()> {
        self.ensure_idle()?;

        let threads = self.workers.len();
        let start = Instant::now();
        let deadline = limits.effective_deadline(start, self.config.move_overhead());
        let interval = self.config.check_interval_nodes.max(1);
        let batch = if limits.nodes.is_some() { (interval / threads as u64).max(1) } else { interval };

        self.tt.bump_generation();
        self.stop.reset();
        self.nodes.store(0, Ordering::Relaxed);

        let (tx, rx) = mpsc::sync_channel(2 * threads);
        let root = pos.clone();
        let tt = Arc::clone(&self.tt);
        let workers = Arc::clone(&self.workers);
        let pool = Arc::clone(&self.pool);
        let reporter = Arc::clone(&self.reporter);
        let stop = self.stop.clone();
        let nodes = Arc::clone(&self.nodes);

        let coordinator = thread::Builder::new()
            .name("search-coordinator".into())
            .spawn(move || {
                let claimed = AtomicU64::new(0);
                let ctx = SearchContext {
                    tt: &tt,
                    limits: &limits,
                    stop: &stop,
                    nodes: &nodes,
                    claimed: &claimed,
                    start,
                    deadline,
                    batch,
                    reporter: &*reporter,
                };
                pool.broadcast(|b| {
                    let i = b.index();
                    let _ = tx.send(WorkerMsg::Started);
                    let Some(slot) = workers.get(i) else {
                        return;
                    };
                    let mut worker = slot.lock().unwrap_or_else(PoisonError::into_inner);
                    match panic::catch_unwind(AssertUnwindSafe(|| worker.run(&root, &ctx))) {
                        Ok(result) => {
                            let _ = tx.send(WorkerMsg::Done(result));
                        }
                        Err(_) => {
                            error!("search worker {i} panicked");
                            stop.stop();
                            let _ = tx.send(WorkerMsg::Panicked(i));
                        }
                    }
                });
            })
            .map_err(|e| EngineError::ThreadStart(e.to_string()))?;

        let mut active = ActiveSearch {
            coordinator,
            rx,
            start,
            deadline,
            threads,
            done: Vec::with_capacity(threads),
            panicked: false,
        };

        let mut started = 0;
        let startup_deadline = start + self.config.join_timeout();
        while started < threads {
            let remaining = startup_deadline.saturating_duration_since(Instant::now());
            match active.rx.recv_timeout(remaining) {
                Ok(WorkerMsg::Started) => started += 1,
                Ok(WorkerMsg::Done(r)) => active.done.push(r),
                Ok(WorkerMsg::Panicked(_)) => active.panicked = true,
                Err(_) => {
                    self.stop.stop();
                    self.orphan = Some(active.coordinator);
                    return Err(EngineError::ThreadStart(format!("only {started} of {threads} workers started")));
                }
            }
        }

        debug!("search started: {threads} workers, deadline {:?}", deadline.map(|d| d - start));
        self.active = Some(active);
        Ok(())
    }

    /// Raises the stop signal. Calling it with no search running is a no-op.
    pub fn stop_search(&self) {
        self.stop.stop();
    }

    /// Blocks until every worker has finished and returns the selected result.
    pub fn wait(&mut self) -> Result<SearchOutcome> {
        let mut active = self.active.take().ok_or(EngineError::NoActiveSearch)?;
        let join_timeout = self.config.join_timeout();
        let mut stop_seen: Option<Instant> = None;

        while active.done.len() < active.threads {
            let now = Instant::now();
            if active.deadline.is_some_and(|d| now >= d) {
                self.stop.stop();
            }
            if self.stop.is_stopped() {
                let since = *stop_seen.get_or_insert(now);
                if now.duration_since(since) > join_timeout {
                    error!("search workers did not stop within {join_timeout:?}");
                    self.orphan = Some(active.coordinator);
                    return Err(EngineError::WorkerJoinTimeout(join_timeout));
                }
            }
            match active.rx.recv_timeout(POLL_INTERVAL) {
                Ok(WorkerMsg::Done(r)) => active.done.push(r),
                Ok(WorkerMsg::Panicked(_)) => {
                    active.panicked = true;
                    active.threads -= 1;
                }
                Ok(WorkerMsg::Started) | Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if active.coordinator.join().is_err() || active.panicked || active.done.len() < active.threads {
            return Err(EngineError::WorkerPanicked);
        }

        let elapsed = active.start.elapsed();
        let nodes = self.nodes.load(Ordering::Relaxed);
        let best = select_result(&active.done).ok_or(EngineError::WorkerPanicked)?;
        let outcome = SearchOutcome {
            best_move: best.best_move,
            ponder: best.pv.get(1).copied(),
            score: Score::from_internal(best.score),
            raw_score: best.score,
            depth: best.depth,
            seldepth: best.seldepth,
            nodes,
            pv: best.pv.clone(),
            worker: best.worker,
            elapsed,
        };
        info!(
            "search finished: depth {} score {} nodes {} in {:?} (worker {})",
            outcome.depth, outcome.score, nodes, elapsed, outcome.worker
        );
        self.reporter.on_finish(&outcome);
        Ok(outcome)
    }

    /// `start_search` followed by `wait`.
    pub fn search(&mut self, pos: &Position, limits: SearchLimits) -> Result<SearchOutcome> {
        self.start_search(pos, limits)?;
        self.wait()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.stop.stop();
        if let Some(active) = self.active.take() {
            let _ = active.coordinator.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(worker: usize, depth: u32, score: i32) -> WorkerResult {
        WorkerResult { worker, depth, score, ..Default::default() }
    }

    #[test]
    fn selection_prefers_depth_then_score_then_index() {
        let rs = vec![result(0, 7, 10), result(1, 8, -5), result(2, 8, 20), result(3, 8, 20)];
        assert_eq!(select_result(&rs).map(|r| r.worker), Some(2));
        let rs = vec![result(0, 5, 0), result(1, 5, 0)];
        assert_eq!(select_result(&rs).map(|r| r.worker), Some(0));
        assert!(select_result(&[]).is_none());
    }

    #[test]
    fn exclusive_operations_rejected_while_searching() {
        let mut pool = ThreadPool::new(SearchConfig { hash_mb: 1, ..Default::default() }).unwrap();
        pool.start_search(&Position::startpos(), SearchLimits::default()).unwrap();
        assert!(matches!(pool.resize_tt(2), Err(EngineError::SearchInProgress)));
        assert!(matches!(pool.clear(), Err(EngineError::SearchInProgress)));
        assert!(matches!(pool.set_threads(2), Err(EngineError::SearchInProgress)));
        pool.stop_search();
        pool.stop_search();
        let out = pool.wait().unwrap();
        assert!(out.best_move.is_some());
        assert!(matches!(pool.wait(), Err(EngineError::NoActiveSearch)));
        pool.resize_tt(2).unwrap();
    }
}
