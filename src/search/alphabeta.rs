//! Single-threaded iterative-deepening searcher.
//!
//! A `SearchWorker` owns its heuristic tables (history, killers, PV, per-ply
//! stack) and shares only the transposition table, node counter and stop
//! signal with its siblings through a `SearchContext`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace, warn};

use crate::board::{Move, MoveList, Piece, Position};
use crate::search::config::{SearchConfig, SearchTuning};
use crate::search::eval::{
    is_mate_score, mate_in, mated_in, Evaluator, DRAW_SCORE, INFINITY, MATE_IN_MAX, MAX_DEPTH, MAX_PLY, PIECE_VALUES,
    TB_WIN_SCORE,
};
use crate::search::limits::{SearchLimits, StopSignal};
use crate::search::ordering::{history_bonus, History, Killers, MovePicker, KILLER_2_SCORE};
use crate::search::report::{Reporter, Score, SearchInfo};
use crate::search::see::see_ge;
use crate::search::tablebase::{probe_if_eligible, EndgameProbe, TbOutcome};
use crate::search::tt::{score_from_tt, score_to_tt, Bound, Tt};

/// Everything a worker shares with the rest of the pool for one search.
pub struct SearchContext<'a> {
    pub tt: &'a Tt,
    pub limits: &'a SearchLimits,
    pub stop: &'a StopSignal,
    /// Nodes flushed by all workers so far.
    pub nodes: &'a AtomicU64,
    /// Nodes handed out against the node budget; never read without one.
    pub claimed: &'a AtomicU64,
    pub start: Instant,
    pub deadline: Option<Instant>,
    /// Nodes a worker claims at a time; flushes and stop polls happen
    /// between claims.
    pub batch: u64,
    pub reporter: &'a dyn Reporter,
}

#[derive(Clone, Debug, Default)]
pub struct WorkerResult {
    pub worker: usize,
    pub best_move: Option<Move>,
    pub score: i32,
    /// Last fully completed iteration; 0 when none completed.
    pub depth: u32,
    pub seldepth: u32,
    pub pv: Vec<Move>,
    pub nodes: u64,
}

#[derive(Clone)]
struct PvLine {
    moves: [Move; MAX_PLY + 1],
    len: usize,
}

impl PvLine {
    fn new() -> Self {
        PvLine { moves: [Move::NULL; MAX_PLY + 1], len: 0 }
    }

    #[inline]
    fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    fn set(&mut self, mv: Move, child: &PvLine) {
        let n = child.len.min(MAX_PLY);
        self.moves[0] = mv;
        self.moves[1..=n].copy_from_slice(&child.moves[..n]);
        self.len = n + 1;
    }

    fn to_vec(&self) -> Vec<Move> {
        self.moves[..self.len].to_vec()
    }
}

#[derive(Clone, Copy, Default)]
struct PlyState {
    static_eval: Option<i32>,
    current_move: Move,
}

#[derive(Clone, Copy, Debug)]
struct RootMove {
    mv: Move,
    score: i32,
}

/// Late-move reduction table indexed by [depth][move number].
fn build_lmr_table(t: &SearchTuning) -> Box<[[u8; 64]; 64]> {
    let mut table = Box::new([[0u8; 64]; 64]);
    let base = t.lmr_base_x100 as f64 / 100.0;
    let div = t.lmr_divisor_x100 as f64 / 100.0;
    for (d, row) in table.iter_mut().enumerate().skip(1) {
        for (m, r) in row.iter_mut().enumerate().skip(1) {
            let v = base + (d as f64).ln() * (m as f64).ln() / div;
            *r = v.max(0.0).min(u8::MAX as f64) as u8;
        }
    }
    table
}

pub struct SearchWorker {
    index: usize,
    tuning: SearchTuning,
    evaluator: Arc<dyn Evaluator>,
    tablebase: Option<Arc<dyn EndgameProbe>>,
    history: History,
    killers: Killers,
    stack: Vec<PlyState>,
    pv: Vec<PvLine>,
    lmr: Box<[[u8; 64]; 64]>,
    nodes: u64,
    unflushed: u64,
    credit: u64,
    seldepth: usize,
    root_depth: i32,
    stopped: bool,
}

impl SearchWorker {
    pub fn new(
        index: usize,
        config: &SearchConfig,
        evaluator: Arc<dyn Evaluator>,
        tablebase: Option<Arc<dyn EndgameProbe>>,
    ) -> Self {
        SearchWorker {
            index,
            tuning: config.tuning.clone(),
            evaluator,
            tablebase,
            history: History::default(),
            killers: Killers::default(),
            stack: vec![PlyState::default(); MAX_PLY + 2],
            pv: vec![PvLine::new(); MAX_PLY + 2],
            lmr: build_lmr_table(&config.tuning),
            nodes: 0,
            unflushed: 0,
            credit: 0,
            seldepth: 0,
            root_depth: 0,
            stopped: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Forgets learned move-ordering state (new game).
    pub fn clear(&mut self) {
        self.history.clear();
        self.killers.clear();
    }

    #[inline]
    fn evaluate(&self, pos: &Position) -> i32 {
        self.evaluator.evaluate(pos).clamp(-TB_WIN_SCORE + 1, TB_WIN_SCORE - 1)
    }

    /// Runs iterative deepening from `root` until the depth limit or stop.
    pub fn run(&mut self, root: &Position, ctx: &SearchContext) -> WorkerResult {
        self.nodes = 0;
        self.unflushed = 0;
        self.credit = 0;
        self.seldepth = 0;
        self.stopped = false;
        self.killers.clear();

        let mut pos = root.clone();
        let mut result = WorkerResult { worker: self.index, ..Default::default() };

        let mut root_moves = self.ordered_root_moves(&pos, ctx);
        if root_moves.is_empty() {
            result.score = if pos.is_in_check() { mated_in(0) } else { DRAW_SCORE };
            self.finish(ctx);
            return result;
        }
        result.best_move = Some(root_moves[0].mv);
        result.pv = vec![root_moves[0].mv];
        if pos.is_insufficient_material() {
            result.score = DRAW_SCORE;
            self.finish(ctx);
            return result;
        }

        let max_depth = ctx.limits.depth.unwrap_or(MAX_DEPTH).clamp(1, MAX_DEPTH);
        let mut prev_score = 0;
        for depth in 1..=max_depth {
            self.root_depth = depth as i32;
            let score = self.aspiration(&mut pos, &mut root_moves, depth as i32, prev_score, ctx);
            if self.stopped {
                break;
            }
            prev_score = score;
            result.depth = depth;
            result.score = score;
            result.seldepth = self.seldepth as u32;
            result.best_move = Some(root_moves[0].mv);
            result.pv = self.pv[0].to_vec();
            if result.pv.first() != Some(&root_moves[0].mv) {
                result.pv = vec![root_moves[0].mv];
            }

            if self.index == 0 {
                self.report(ctx, &result);
            }
            debug!("worker {} finished depth {} score {} nodes {}", self.index, depth, score, self.nodes);

            if ctx.deadline.is_some_and(|d| Instant::now() >= d) || ctx.stop.is_stopped() {
                break;
            }
        }

        self.finish(ctx);
        result.nodes = self.nodes;
        result
    }

    fn finish(&mut self, ctx: &SearchContext) {
        if self.unflushed > 0 {
            ctx.nodes.fetch_add(self.unflushed, Ordering::Relaxed);
            self.unflushed = 0;
        }
        // The main worker's loop defines the search; helpers follow it.
        if self.index == 0 {
            ctx.stop.stop();
        }
    }

    fn report(&self, ctx: &SearchContext, result: &WorkerResult) {
        let elapsed = ctx.start.elapsed();
        let nodes = ctx.nodes.load(Ordering::Relaxed) + self.unflushed;
        let nps = (nodes as f64 / elapsed.as_secs_f64().max(1e-6)) as u64;
        let info = SearchInfo {
            depth: result.depth,
            seldepth: result.seldepth,
            score: Score::from_internal(result.score),
            nodes,
            nps,
            elapsed,
            hashfull: ctx.tt.hashfull(),
            pv: result.pv.clone(),
        };
        ctx.reporter.on_iteration(&info);
    }

    fn ordered_root_moves(&self, pos: &Position, ctx: &SearchContext) -> Vec<RootMove> {
        let hash_move = ctx.tt.probe(pos.hash()).and_then(|e| e.best);
        let mut picker = MovePicker::new(pos, hash_move, [Move::NULL; 2], &self.history);
        let mut all = Vec::with_capacity(picker.len());
        while let Some((mv, _)) = picker.next() {
            all.push(RootMove { mv, score: -INFINITY });
        }
        let allowed = &ctx.limits.searchmoves;
        if allowed.is_empty() {
            return all;
        }
        let filtered: Vec<RootMove> = all.iter().copied().filter(|rm| allowed.contains(&rm.mv)).collect();
        if filtered.is_empty() {
            warn!("none of the requested searchmoves is legal, searching all moves");
            return all;
        }
        filtered
    }

    /// Spends one node of the current claim, claiming a new batch first when
    /// the claim is used up. Sets `stopped` instead when no claim is granted.
    #[inline]
    fn count_node(&mut self, ctx: &SearchContext) {
        if self.credit == 0 {
            self.flush_and_claim(ctx);
            if self.stopped {
                return;
            }
        }
        self.credit -= 1;
        self.nodes += 1;
        self.unflushed += 1;
    }

    fn flush_and_claim(&mut self, ctx: &SearchContext) {
        if self.unflushed > 0 {
            ctx.nodes.fetch_add(self.unflushed, Ordering::Relaxed);
            self.unflushed = 0;
        }
        if ctx.deadline.is_some_and(|d| Instant::now() >= d) {
            ctx.stop.stop();
        }
        if ctx.stop.is_stopped() {
            self.stopped = true;
            return;
        }
        self.credit = match ctx.limits.nodes {
            None => ctx.batch,
            Some(budget) => {
                // Claims never overlap, so searched nodes stay within the budget.
                let taken = ctx.claimed.fetch_add(ctx.batch, Ordering::Relaxed);
                if taken >= budget {
                    ctx.stop.stop();
                    self.stopped = true;
                    return;
                }
                ctx.batch.min(budget - taken)
            }
        };
    }

    fn aspiration(&mut self, pos: &mut Position, root_moves: &mut [RootMove], depth: i32, prev: i32, ctx: &SearchContext) -> i32 {
        let mut delta = self.tuning.aspiration_delta + self.tuning.helper_aspiration_step * self.index as i32;
        let (mut alpha, mut beta) = if depth >= self.tuning.aspiration_min_depth as i32 && !is_mate_score(prev) {
            ((prev - delta).max(-INFINITY), (prev + delta).min(INFINITY))
        } else {
            (-INFINITY, INFINITY)
        };
        loop {
            let score = self.search_root(pos, root_moves, depth, alpha, beta, ctx);
            if self.stopped {
                return score;
            }
            if score <= alpha {
                trace!("worker {} depth {} fail low {} <= {}", self.index, depth, score, alpha);
                beta = (alpha + beta) / 2;
                alpha = (score - delta).max(-INFINITY);
            } else if score >= beta {
                trace!("worker {} depth {} fail high {} >= {}", self.index, depth, score, beta);
                beta = (score + delta).min(INFINITY);
            } else {
                return score;
            }
            delta = (delta * self.tuning.aspiration_growth_pct / 100).max(delta + 1);
        }
    }

    fn search_root(
        &mut self,
        pos: &mut Position,
        root_moves: &mut [RootMove],
        depth: i32,
        mut alpha: i32,
        beta: i32,
        ctx: &SearchContext,
    ) -> i32 {
        let orig_alpha = alpha;
        let mut best = -INFINITY;
        self.pv[0].clear();
        root_moves.iter_mut().for_each(|rm| rm.score = -INFINITY);

        for i in 0..root_moves.len() {
            let mv = root_moves[i].mv;
            self.stack[0].current_move = mv;
            let undo = pos.make(mv);
            let ext = i32::from(self.tuning.check_extension && pos.is_in_check());
            let new_depth = depth - 1 + ext;
            let score = if i == 0 {
                -self.negamax(pos, new_depth, -beta, -alpha, 1, true, ctx)
            } else {
                let s = -self.negamax(pos, new_depth, -alpha - 1, -alpha, 1, false, ctx);
                if s > alpha && s < beta { -self.negamax(pos, new_depth, -beta, -alpha, 1, true, ctx) } else { s }
            };
            pos.unmake(undo);
            if self.stopped {
                return best;
            }

            root_moves[i].score = if i == 0 || score > alpha { score } else { -INFINITY };
            best = best.max(score);
            if score > alpha {
                self.update_pv(0, mv);
                if score >= beta {
                    break;
                }
                alpha = score;
            }
        }

        // Best first; the rest keep their relative order unless they raised alpha.
        root_moves.sort_by(|a, b| b.score.cmp(&a.score));

        let bound = if best >= beta {
            Bound::Lower
        } else if best > orig_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        ctx.tt.store(pos.hash(), depth as u32, score_to_tt(best, 0), bound, Some(root_moves[0].mv));
        best
    }

    #[inline]
    fn update_pv(&mut self, ply: usize, mv: Move) {
        let (head, tail) = self.pv.split_at_mut(ply + 1);
        head[ply].set(mv, &tail[0]);
    }

    #[allow(clippy::too_many_arguments)]
    fn negamax(
        &mut self,
        pos: &mut Position,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        ply: usize,
        pv_node: bool,
        ctx: &SearchContext,
    ) -> i32 {
        if self.stopped {
            return 0;
        }
        if depth <= 0 {
            return self.qsearch(pos, alpha, beta, ply, ctx);
        }
        self.count_node(ctx);
        if self.stopped {
            return 0;
        }
        self.pv[ply].clear();
        self.seldepth = self.seldepth.max(ply);
        if ply >= MAX_PLY {
            return self.evaluate(pos);
        }
        if pos.is_draw() {
            return DRAW_SCORE;
        }

        // Mate distance pruning
        alpha = alpha.max(mated_in(ply));
        beta = beta.min(mate_in(ply + 1));
        if alpha >= beta {
            return alpha;
        }

        let in_check = pos.is_in_check();
        let entry = ctx.tt.probe(pos.hash());
        let hash_move = entry.and_then(|e| e.best);
        if let Some(e) = entry {
            if !pv_node && e.depth as i32 >= depth {
                let s = score_from_tt(e.score, ply);
                match e.bound {
                    Bound::Exact => return s,
                    Bound::Lower if s >= beta => return s,
                    Bound::Upper if s <= alpha => return s,
                    _ => {}
                }
            }
        }

        if let Some(probe) = probe_if_eligible(self.tablebase.as_deref(), pos, ply) {
            let s = probe.to_score(ply);
            let bound = match probe.outcome {
                TbOutcome::Win => Bound::Lower,
                TbOutcome::Loss => Bound::Upper,
                TbOutcome::Draw => Bound::Exact,
            };
            if bound == Bound::Exact || (bound == Bound::Lower && s >= beta) || (bound == Bound::Upper && s <= alpha) {
                ctx.tt.store(pos.hash(), depth as u32, score_to_tt(s, ply), bound, None);
                return s;
            }
        }

        let static_eval = if in_check { None } else { Some(self.evaluate(pos)) };
        self.stack[ply].static_eval = static_eval;
        self.killers.clear_ply(ply + 1);
        let side = pos.side_to_move();

        if let (false, Some(eval)) = (pv_node, static_eval) {
            // Reverse futility
            if depth <= self.tuning.rfp_max_depth as i32
                && !is_mate_score(beta)
                && eval - self.tuning.rfp_margin * depth >= beta
            {
                return eval;
            }

            // Null move
            if depth >= self.tuning.null_move_min_depth as i32
                && eval >= beta
                && !is_mate_score(beta)
                && pos.has_non_pawn_material(side)
                && !self.stack[ply - 1].current_move.is_null()
            {
                let r = (self.tuning.null_move_base_reduction + depth as u32 / self.tuning.null_move_depth_divisor) as i32;
                self.stack[ply].current_move = Move::NULL;
                let token = pos.make_null();
                let score = -self.negamax(pos, depth - 1 - r, -beta, -beta + 1, ply + 1, false, ctx);
                pos.unmake_null(token);
                if self.stopped {
                    return 0;
                }
                if score >= beta {
                    return if is_mate_score(score) { beta } else { score };
                }
            }
        }

        // Internal iterative reduction
        let depth = if hash_move.is_none() && depth >= self.tuning.iir_min_depth as i32 { depth - 1 } else { depth };

        let mut picker = MovePicker::new(pos, hash_move, self.killers.get(ply), &self.history);
        if picker.is_empty() {
            return if in_check { mated_in(ply) } else { DRAW_SCORE };
        }

        let orig_alpha = alpha;
        let mut best = -INFINITY;
        let mut best_move: Option<Move> = None;
        let mut moves_searched = 0usize;
        let mut quiets_seen = 0usize;
        let mut quiets_tried = MoveList::new();
        let can_prune = !pv_node && !in_check;

        while let Some((mv, order_score)) = picker.next() {
            let is_quiet = !mv.is_tactical();
            if is_quiet {
                quiets_seen += 1;
            }

            if can_prune && moves_searched > 0 && best > -MATE_IN_MAX {
                if is_quiet {
                    if depth <= self.tuning.lmp_max_depth as i32
                        && quiets_seen > self.tuning.lmp_base + (depth * depth) as usize
                    {
                        continue;
                    }
                    if let Some(eval) = static_eval {
                        if depth <= self.tuning.futility_max_depth as i32
                            && eval + self.tuning.futility_base + self.tuning.futility_margin * depth <= alpha
                        {
                            continue;
                        }
                    }
                    if !see_ge(pos, mv, self.tuning.see_quiet_margin * depth) {
                        continue;
                    }
                } else if !see_ge(pos, mv, self.tuning.see_capture_margin * depth * depth) {
                    continue;
                }
            }

            self.stack[ply].current_move = mv;
            let undo = pos.make(mv);
            let gives_check = pos.is_in_check();
            let ext = i32::from(self.tuning.check_extension && gives_check && (ply as i32) < 2 * self.root_depth);
            let new_depth = depth - 1 + ext;

            let score = if moves_searched == 0 {
                -self.negamax(pos, new_depth, -beta, -alpha, ply + 1, pv_node, ctx)
            } else {
                let mut r = 0;
                if depth >= self.tuning.lmr_min_depth as i32
                    && moves_searched >= self.tuning.lmr_first_reduced_move
                    && is_quiet
                    && !in_check
                    && !gives_check
                {
                    r = self.lmr[(depth as usize).min(63)][moves_searched.min(63)] as i32;
                    if pv_node {
                        r -= 1;
                    }
                    if order_score >= KILLER_2_SCORE {
                        r -= 1;
                    }
                    r = r.clamp(0, (new_depth - 1).max(0));
                }
                let mut s = -self.negamax(pos, new_depth - r, -alpha - 1, -alpha, ply + 1, false, ctx);
                if s > alpha && r > 0 {
                    s = -self.negamax(pos, new_depth, -alpha - 1, -alpha, ply + 1, false, ctx);
                }
                if pv_node && s > alpha && s < beta {
                    s = -self.negamax(pos, new_depth, -beta, -alpha, ply + 1, true, ctx);
                }
                s
            };
            pos.unmake(undo);
            if self.stopped {
                return 0;
            }
            moves_searched += 1;

            if score > best {
                best = score;
                if score > alpha {
                    best_move = Some(mv);
                    if pv_node {
                        self.update_pv(ply, mv);
                    }
                    if score >= beta {
                        if is_quiet {
                            self.killers.store(ply, mv);
                            let bonus = history_bonus(depth as u32);
                            self.history.update(side, mv, bonus);
                            for &q in quiets_tried.iter() {
                                self.history.update(side, q, -bonus);
                            }
                        }
                        break;
                    }
                    alpha = score;
                }
            }
            if is_quiet {
                quiets_tried.push(mv);
            }
        }

        let bound = if best >= beta {
            Bound::Lower
        } else if best > orig_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        ctx.tt.store(pos.hash(), depth as u32, score_to_tt(best, ply), bound, best_move);
        best
    }

    fn qsearch(&mut self, pos: &mut Position, mut alpha: i32, beta: i32, ply: usize, ctx: &SearchContext) -> i32 {
        if self.stopped {
            return 0;
        }
        self.count_node(ctx);
        if self.stopped {
            return 0;
        }
        self.pv[ply.min(MAX_PLY)].clear();
        self.seldepth = self.seldepth.max(ply);
        if ply >= MAX_PLY {
            return self.evaluate(pos);
        }
        if pos.is_draw() {
            return DRAW_SCORE;
        }

        let entry = ctx.tt.probe(pos.hash());
        let hash_move = entry.and_then(|e| e.best);
        if let Some(e) = entry {
            let s = score_from_tt(e.score, ply);
            match e.bound {
                Bound::Exact => return s,
                Bound::Lower if s >= beta => return s,
                Bound::Upper if s <= alpha => return s,
                _ => {}
            }
        }

        let in_check = pos.is_in_check();
        let stand = if in_check { None } else { Some(self.evaluate(pos)) };
        let mut best = -INFINITY;
        if let Some(eval) = stand {
            if eval >= beta {
                return eval;
            }
            alpha = alpha.max(eval);
            best = eval;
        }
        let orig_alpha = alpha;

        let mut picker = MovePicker::new_quiescence(pos, in_check, hash_move, &self.history);
        if in_check && picker.is_empty() {
            return mated_in(ply);
        }

        let mut best_move: Option<Move> = None;
        while let Some((mv, _)) = picker.next() {
            if let Some(eval) = stand {
                // Delta pruning
                if mv.promotion().is_none() {
                    let victim = if mv.is_en_passant() { Some(Piece::Pawn) } else { pos.piece_on(mv.to()) };
                    let gain = victim.map_or(0, |p| PIECE_VALUES[p.index()]);
                    if eval + gain + self.tuning.qsearch_delta_margin <= alpha {
                        continue;
                    }
                }
                if !see_ge(pos, mv, 0) {
                    continue;
                }
            }

            let undo = pos.make(mv);
            let score = -self.qsearch(pos, -beta, -alpha, ply + 1, ctx);
            pos.unmake(undo);
            if self.stopped {
                return 0;
            }

            if score > best {
                best = score;
                if score > alpha {
                    best_move = Some(mv);
                    if score >= beta {
                        break;
                    }
                    alpha = score;
                }
            }
        }

        let bound = if best >= beta {
            Bound::Lower
        } else if best > orig_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        ctx.tt.store(pos.hash(), 0, score_to_tt(best, ply), bound, best_move);
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::eval::MaterialEval;
    use crate::search::report::NullReporter;

    fn run_single(fen: &str, limits: SearchLimits) -> WorkerResult {
        let cfg = SearchConfig::default();
        let tt = Tt::default();
        let stop = StopSignal::new();
        let nodes = AtomicU64::new(0);
        let claimed = AtomicU64::new(0);
        let ctx = SearchContext {
            tt: &tt,
            limits: &limits,
            stop: &stop,
            nodes: &nodes,
            claimed: &claimed,
            start: Instant::now(),
            deadline: None,
            batch: cfg.check_interval_nodes,
            reporter: &NullReporter,
        };
        let mut w = SearchWorker::new(0, &cfg, Arc::new(MaterialEval), None);
        w.run(&Position::from_fen(fen).unwrap(), &ctx)
    }

    #[test]
    fn captures_hanging_queen() {
        let r = run_single("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1", SearchLimits::depth(3));
        assert_eq!(r.best_move.map(|m| m.to_string()), Some("d1d5".to_string()));
        assert!(r.score > 300);
        assert_eq!(r.depth, 3);
    }

    #[test]
    fn node_budget_is_spent_exactly() {
        let r = run_single("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3", SearchLimits::nodes(5_000));
        assert_eq!(r.nodes, 5_000);
        assert!(r.best_move.is_some());
    }

    #[test]
    fn pv_starts_with_best_move() {
        let r = run_single("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3", SearchLimits::depth(4));
        assert_eq!(r.pv.first().copied(), r.best_move);
    }

    #[test]
    fn lmr_table_grows_with_depth_and_move_number() {
        let t = build_lmr_table(&SearchTuning::default());
        assert!(t[20][30] >= t[3][4]);
        assert_eq!(t[1][1], (SearchTuning::default().lmr_base_x100 / 100) as u8);
    }
}
