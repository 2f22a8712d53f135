use std::time::{Duration, Instant};
use titan_smp::board::Position;
use titan_smp::search::{SearchConfig, SearchLimits, ThreadPool};

#[test]
fn movetime_returns_quickly_with_move() {
    let mut pool = ThreadPool::new(SearchConfig { hash_mb: 4, move_overhead_ms: 0, ..Default::default() }).unwrap();
    let limits = SearchLimits { depth: Some(60), movetime: Some(Duration::from_millis(10)), ..Default::default() };
    let t0 = Instant::now();
    let out = pool.search(&Position::startpos(), limits).unwrap();
    let elapsed = t0.elapsed();
    assert!(out.best_move.is_some(), "no bestmove under movetime");
    assert!(elapsed < Duration::from_millis(300), "search exceeded time: {elapsed:?}");
}

#[test]
fn absolute_deadline_is_honoured() {
    let mut pool = ThreadPool::new(SearchConfig { threads: 2, hash_mb: 4, ..Default::default() }).unwrap();
    let limits = SearchLimits { deadline: Some(Instant::now() + Duration::from_millis(50)), ..Default::default() };
    let t0 = Instant::now();
    let out = pool.search(&Position::startpos(), limits).unwrap();
    assert!(out.best_move.is_some());
    assert!(t0.elapsed() < Duration::from_millis(500), "deadline overrun: {:?}", t0.elapsed());
}

#[test]
fn external_stop_ends_an_infinite_search() {
    let mut pool = ThreadPool::new(SearchConfig { threads: 2, hash_mb: 4, ..Default::default() }).unwrap();
    let stop = pool.stop_handle();
    pool.start_search(&Position::startpos(), SearchLimits::default()).unwrap();
    assert!(pool.is_searching());
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        stop.stop();
    });
    let out = pool.wait().unwrap();
    stopper.join().unwrap();
    assert!(out.best_move.is_some());
    assert!(!pool.is_searching());
}
