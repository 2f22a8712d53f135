// Perft using make/unmake on a single position (no cloning below the root)
use rayon::prelude::*;

use crate::board::{Move, Position};

pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = pos.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for &mv in moves.iter() {
        let undo = pos.make(mv);
        nodes += perft(pos, depth - 1);
        pos.unmake(undo);
    }
    nodes
}

/// Per-root-move node counts, in generation order.
pub fn divide(pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    let moves = pos.legal_moves();
    let mut out = Vec::with_capacity(moves.len());
    for &mv in moves.iter() {
        let undo = pos.make(mv);
        out.push((mv, perft(pos, depth - 1)));
        pos.unmake(undo);
    }
    out
}

/// Root-split perft on the current rayon pool; each root move gets its own clone.
pub fn perft_parallel(pos: &Position, depth: u32) -> u64 {
    if depth <= 1 {
        return perft(&mut pos.clone(), depth);
    }
    let moves: Vec<Move> = pos.legal_moves().iter().copied().collect();
    moves
        .par_iter()
        .map(|&mv| {
            let mut child = pos.clone();
            let _ = child.make(mv);
            perft(&mut child, depth - 1)
        })
        .sum()
}
