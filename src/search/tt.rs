//! Shared transposition table.
//!
//! Probes and stores run concurrently from every worker without locks. A
//! slot is two `AtomicU64` words: `check = key ^ data` and `data`. Readers
//! recompute `check ^ data` and compare it with the probed key, so a slot
//! whose words come from two different writes fails verification and reads
//! as a miss. Scores read back are advisory; the search re-validates moves.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use log::debug;

use crate::board::Move;
use crate::error::{EngineError, Result};
use crate::search::eval::{MAX_PLY, TB_WIN_SCORE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: u64,
    pub depth: u32,
    pub score: i32,
    pub best: Option<Move>,
    pub bound: Bound,
    pub gen: u8,
}

const WAYS: usize = 4;
const DEFAULT_ENTRIES: usize = 4096;
const HASHFULL_SAMPLE_BUCKETS: usize = 250;
/// Depth-equivalent cost of one generation of age when choosing a victim.
const AGE_WEIGHT: i32 = 8;

// data word layout
const MOVE_BITS: u32 = Move::BITS;
const SCORE_SHIFT: u32 = MOVE_BITS;
const DEPTH_SHIFT: u32 = SCORE_SHIFT + 16;
const BOUND_SHIFT: u32 = DEPTH_SHIFT + 8;
const GEN_SHIFT: u32 = BOUND_SHIFT + 2;

#[derive(Default)]
struct Slot {
    check: AtomicU64,
    data: AtomicU64,
}

#[derive(Default)]
#[repr(align(64))]
struct Bucket {
    slots: [Slot; WAYS],
}

pub struct Tt {
    buckets: Vec<Bucket>,
    gen: AtomicU32,
}

fn pack(depth: u32, score: i32, best: Option<Move>, bound: Bound, gen: u8) -> u64 {
    let mv = best.map_or(0, |m| m.raw()) as u64;
    let score = score.clamp(i16::MIN as i32, i16::MAX as i32) as i16 as u16 as u64;
    let depth = depth.min(u8::MAX as u32) as u64;
    let bound = match bound {
        Bound::Exact => 1u64,
        Bound::Lower => 2,
        Bound::Upper => 3,
    };
    mv | score << SCORE_SHIFT | depth << DEPTH_SHIFT | bound << BOUND_SHIFT | (gen as u64) << GEN_SHIFT
}

fn unpack(key: u64, data: u64) -> Option<Entry> {
    let bound = match (data >> BOUND_SHIFT) & 3 {
        1 => Bound::Exact,
        2 => Bound::Lower,
        3 => Bound::Upper,
        _ => return None,
    };
    let mv = Move::from_raw((data & ((1 << MOVE_BITS) - 1)) as u32);
    Some(Entry {
        key,
        depth: ((data >> DEPTH_SHIFT) & 0xFF) as u32,
        score: ((data >> SCORE_SHIFT) & 0xFFFF) as u16 as i16 as i32,
        best: if mv.is_null() { None } else { Some(mv) },
        bound,
        gen: ((data >> GEN_SHIFT) & 0xFF) as u8,
    })
}

impl Default for Tt {
    fn default() -> Self {
        let mut tt = Tt { buckets: Vec::new(), gen: AtomicU32::new(0) };
        tt.set_capacity_entries(DEFAULT_ENTRIES);
        tt
    }
}

impl Tt {
    /// Allocates a table of roughly `mb` megabytes.
    pub fn new(mb: usize) -> Result<Self> {
        let mut tt = Tt { buckets: Vec::new(), gen: AtomicU32::new(0) };
        tt.resize(mb)?;
        Ok(tt)
    }

    fn allocate(buckets: usize, mb: usize) -> Result<Vec<Bucket>> {
        let mut v: Vec<Bucket> = Vec::new();
        v.try_reserve_exact(buckets).map_err(|_| EngineError::TtAllocation { mb })?;
        v.resize_with(buckets, Bucket::default);
        Ok(v)
    }

    /// Replaces the storage; all entries are lost. Requires exclusive access.
    pub fn resize(&mut self, mb: usize) -> Result<()> {
        let bytes = mb.max(1).saturating_mul(1024 * 1024);
        let buckets = (bytes / std::mem::size_of::<Bucket>()).max(1);
        self.buckets = Self::allocate(buckets, mb)?;
        debug!("tt resized to {} MB ({} entries)", mb, buckets * WAYS);
        Ok(())
    }

    /// Sizes the table to hold at least `cap` entries (rounded up to whole buckets).
    pub fn set_capacity_entries(&mut self, cap: usize) {
        let buckets = cap.max(WAYS).div_ceil(WAYS);
        self.buckets.clear();
        self.buckets.resize_with(buckets, Bucket::default);
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len() * WAYS
    }

    pub fn clear(&mut self) {
        for b in &mut self.buckets {
            *b = Bucket::default();
        }
        *self.gen.get_mut() = 0;
    }

    /// Starts a new search generation. Called once per top-level search.
    pub fn bump_generation(&self) {
        let _ = self.gen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn generation(&self) -> u32 {
        self.gen.load(Ordering::Relaxed)
    }

    #[inline]
    fn gen_tag(&self) -> u8 {
        self.generation() as u8
    }

    #[inline]
    fn bucket(&self, key: u64) -> &Bucket {
        let idx = ((key as u128 * self.buckets.len() as u128) >> 64) as usize;
        &self.buckets[idx]
    }

    pub fn probe(&self, key: u64) -> Option<Entry> {
        if self.buckets.is_empty() {
            return None;
        }
        for slot in &self.bucket(key).slots {
            let data = slot.data.load(Ordering::Relaxed);
            let check = slot.check.load(Ordering::Relaxed);
            if data != 0 && check ^ data == key {
                return unpack(key, data);
            }
        }
        None
    }

    pub fn store(&self, key: u64, depth: u32, score: i32, bound: Bound, best: Option<Move>) {
        if self.buckets.is_empty() {
            return;
        }
        let gen = self.gen_tag();
        let bucket = self.bucket(key);

        let mut victim = 0usize;
        let mut victim_priority = i32::MAX;
        for (i, slot) in bucket.slots.iter().enumerate() {
            let data = slot.data.load(Ordering::Relaxed);
            let check = slot.check.load(Ordering::Relaxed);
            if data == 0 {
                if victim_priority != i32::MIN {
                    victim = i;
                    victim_priority = i32::MIN;
                }
                continue;
            }
            if check ^ data == key {
                if let Some(old) = unpack(key, data) {
                    if bound != Bound::Exact && depth < old.depth && old.gen == gen {
                        return;
                    }
                    let best = best.or(old.best);
                    Self::write(slot, key, pack(depth, score, best, bound, gen));
                    return;
                }
            }
            let old_depth = ((data >> DEPTH_SHIFT) & 0xFF) as i32;
            let old_gen = ((data >> GEN_SHIFT) & 0xFF) as u8;
            let age = gen.wrapping_sub(old_gen) as i32;
            let priority = old_depth - AGE_WEIGHT * age;
            if priority < victim_priority {
                victim = i;
                victim_priority = priority;
            }
        }
        Self::write(&bucket.slots[victim], key, pack(depth, score, best, bound, gen));
    }

    #[inline]
    fn write(slot: &Slot, key: u64, data: u64) {
        slot.check.store(key ^ data, Ordering::Relaxed);
        slot.data.store(data, Ordering::Relaxed);
    }

    /// Occupied slots. Walks the whole table; meant for tests and diagnostics.
    pub fn len(&self) -> usize {
        self.buckets.iter().flat_map(|b| b.slots.iter()).filter(|s| s.data.load(Ordering::Relaxed) != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Permille of sampled slots holding current-generation entries.
    pub fn hashfull(&self) -> u32 {
        let sample = self.buckets.len().min(HASHFULL_SAMPLE_BUCKETS);
        if sample == 0 {
            return 0;
        }
        let gen = self.gen_tag();
        let used = self.buckets[..sample]
            .iter()
            .flat_map(|b| b.slots.iter())
            .filter(|s| {
                let data = s.data.load(Ordering::Relaxed);
                data != 0 && ((data >> GEN_SHIFT) & 0xFF) as u8 == gen
            })
            .count();
        (used * 1000 / (sample * WAYS)) as u32
    }
}

const TT_MATE_BOUND: i32 = TB_WIN_SCORE - MAX_PLY as i32;

/// Converts a root-relative mate/TB score to node-relative before storing.
#[inline]
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= TT_MATE_BOUND {
        score + ply as i32
    } else if score <= -TT_MATE_BOUND {
        score - ply as i32
    } else {
        score
    }
}

#[inline]
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= TT_MATE_BOUND {
        score - ply as i32
    } else if score <= -TT_MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, Square};
    use crate::search::eval::mate_in;

    #[test]
    fn pack_keeps_every_field() {
        let mv = Move::new(Square::parse("e7").unwrap(), Square::parse("e8").unwrap(), Some(Piece::Queen), 0);
        let data = pack(37, -1234, Some(mv), Bound::Lower, 201);
        let e = unpack(9, data).unwrap();
        assert_eq!(e, Entry { key: 9, depth: 37, score: -1234, best: Some(mv), bound: Bound::Lower, gen: 201 });
    }

    #[test]
    fn torn_slot_reads_as_miss() {
        let tt = Tt::default();
        tt.store(42, 5, 10, Bound::Exact, None);
        // Overwrite only the data word, as if a racing writer were halfway done.
        let slot = tt.bucket(42).slots.iter().find(|s| s.data.load(Ordering::Relaxed) != 0).unwrap();
        slot.data.store(pack(9, 99, None, Bound::Upper, 0), Ordering::Relaxed);
        assert!(tt.probe(42).is_none());
    }

    #[test]
    fn mate_scores_are_ply_adjusted() {
        let root = mate_in(7);
        let stored = score_to_tt(root, 3);
        assert_eq!(stored, mate_in(4));
        assert_eq!(score_from_tt(stored, 3), root);
        assert_eq!(score_to_tt(25, 3), 25);
    }
}
