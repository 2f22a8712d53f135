use criterion::{black_box, criterion_group, criterion_main, Criterion};
use titan_smp::board::Position;
use titan_smp::search::{SearchConfig, SearchLimits, ThreadPool};

fn bench_search(c: &mut Criterion) {
    let pos = Position::startpos();
    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    for threads in [1usize, 4] {
        group.bench_function(format!("depth_6_startpos_{threads}t"), |ben| {
            let cfg = SearchConfig { threads, hash_mb: 16, ..Default::default() };
            let mut pool = ThreadPool::new(cfg).unwrap();
            ben.iter(|| {
                pool.clear().unwrap();
                let out = pool.search(black_box(&pos), SearchLimits::depth(6)).unwrap();
                black_box(out.nodes)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
