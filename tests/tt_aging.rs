use titan_smp::search::tt::{Bound, Tt};

#[test]
fn aging_eviction_prefers_oldest_when_depth_equal() {
    let mut tt = Tt::default();
    // Single bucket with 4 ways
    tt.set_capacity_entries(4);
    for key in 1..=4u64 {
        tt.store(key, 5, 0, Bound::Exact, None);
        tt.bump_generation();
    }
    // New entry at same depth evicts the oldest (key=1)
    tt.store(99, 5, 0, Bound::Exact, None);
    assert!(tt.probe(1).is_none(), "oldest entry not evicted at equal depth");
    assert!(tt.probe(99).is_some(), "new entry not inserted");
}

#[test]
fn stale_deep_entry_loses_to_fresh_shallow_ones() {
    let mut tt = Tt::default();
    tt.set_capacity_entries(4);
    tt.store(1, 12, 0, Bound::Exact, None);
    for _ in 0..4 {
        tt.bump_generation();
    }
    for key in 2..=4u64 {
        tt.store(key, 2, 0, Bound::Exact, None);
    }
    tt.store(50, 2, 0, Bound::Exact, None);
    assert!(tt.probe(1).is_none(), "entry aged four generations should be replaced first");
    for key in [2u64, 3, 4, 50] {
        assert!(tt.probe(key).is_some());
    }
}

#[test]
fn generation_strictly_increases() {
    let tt = Tt::default();
    let mut last = tt.generation();
    for _ in 0..5 {
        tt.bump_generation();
        assert!(tt.generation() > last);
        last = tt.generation();
    }
}

#[test]
fn hashfull_counts_current_generation_only() {
    let mut tt = Tt::default();
    tt.set_capacity_entries(4);
    for key in 0..4u64 {
        tt.store(key, 1, 0, Bound::Exact, None);
    }
    assert_eq!(tt.hashfull(), 1000);
    tt.bump_generation();
    assert_eq!(tt.hashfull(), 0);
    tt.clear();
    assert!(tt.is_empty());
}
