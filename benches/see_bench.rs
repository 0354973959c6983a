use boardstate::movegen::legal_moves;
use boardstate::Position;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_see(c: &mut Criterion) {
    let mut group = c.benchmark_group("see");
    let pos =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    let captures: Vec<_> = legal_moves(&pos).into_iter().filter(|&m| pos.capture(m)).collect();

    group.bench_function("see_ge_zero", |b| {
        b.iter(|| captures.iter().filter(|&&m| pos.see_ge(black_box(m), 0)).count())
    });
    group.bench_function("see_exact", |b| b.iter(|| captures.iter().map(|&m| pos.see(black_box(m))).sum::<i32>()));
    group.finish();
}

criterion_group!(benches, bench_see);
criterion_main!(benches);
