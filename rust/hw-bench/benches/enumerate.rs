use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hw_bench::{default_engine, row_coords, wet_world};
use hw_mcts::{enumerate_actions, narrow_action_space, sample_actions, SearchRng};
use rand_core::SeedableRng;

fn bench_enumerate(c: &mut Criterion) {
    let mut g = c.benchmark_group("hw_mcts_enumerate");
    for &(n, k) in &[(16u32, 2usize), (24, 3), (36, 2)] {
        let coords = row_coords(n);
        g.bench_with_input(
            BenchmarkId::new("enumerate_actions", format!("n{n}_k{k}")),
            &coords,
            |b, coords| b.iter(|| black_box(enumerate_actions(black_box(coords), k))),
        );
    }
    g.finish();
}

fn bench_branching(c: &mut Criterion) {
    let mut g = c.benchmark_group("hw_mcts_branching");
    let world = wet_world(6, 6, 1);
    g.bench_function("narrow_action_space_6x6", |b| {
        b.iter(|| black_box(narrow_action_space(black_box(&world), 10.0)))
    });

    let actions = enumerate_actions(&row_coords(36), 2);
    g.bench_function("sample_actions_m20", |b| {
        let mut rng = SearchRng::seed_from_u64(0);
        b.iter(|| black_box(sample_actions(actions.clone(), 20, &mut rng)))
    });

    let engine = default_engine();
    g.bench_function("branched_actions_6x6", |b| {
        let mut rng = SearchRng::seed_from_u64(0);
        b.iter(|| black_box(engine.branched_actions(&world, &mut rng)))
    });
    g.finish();
}

criterion_group!(benches, bench_enumerate, bench_branching);
criterion_main!(benches);
