use criterion::{black_box, criterion_group, criterion_main, Criterion};
use titan_smp::board::Position;
use titan_smp::perft::perft;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_perft(c: &mut Criterion) {
    c.bench_function("perft_4_startpos", |ben| {
        let mut pos = Position::startpos();
        ben.iter(|| black_box(perft(&mut pos, black_box(4))))
    });
    c.bench_function("perft_3_kiwipete", |ben| {
        let mut pos = Position::from_fen(KIWIPETE).unwrap();
        ben.iter(|| black_box(perft(&mut pos, black_box(3))))
    });
}

criterion_group!(benches, bench_perft);
criterion_main!(benches);
