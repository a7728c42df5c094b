use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use life_core::{seed_random, CpuSimulation, GridDims, SeedConfig};

fn bench_cpu_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_step");
    for size in [32u32, 128, 512] {
        let dims = GridDims::square(size).expect("positive size");
        let seed = SeedConfig {
            probability: 0.4,
            seed: Some(42),
        };
        let initial = seed_random(dims, &seed).expect("valid probability");
        group.bench_with_input(BenchmarkId::from_parameter(size), &initial, |b, initial| {
            let mut sim = CpuSimulation::new(initial.clone());
            b.iter(|| {
                sim.step();
                black_box(sim.current_index());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cpu_step);
criterion_main!(benches);
