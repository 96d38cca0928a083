use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use swarm_pso_core::prelude::*;

fn scenario<N: Numeric>(num_particles: usize) -> ParticleSwarmConfig<N> {
    ParticleSwarmConfig {
        num_particles,
        max_iterations: 100,
        ..ParticleSwarmConfig::default()
    }
}

fn bench_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("sphere_100_iterations");
    for num_particles in [10usize, 100] {
        group.bench_with_input(
            BenchmarkId::new("f64", num_particles),
            &num_particles,
            |b, &n| {
                b.iter(|| {
                    let mut pso = ParticleSwarm::new(scenario::<f64>(n), Sphere).unwrap();
                    black_box(pso.optimize().unwrap())
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("fix16", num_particles),
            &num_particles,
            |b, &n| {
                b.iter(|| {
                    let mut pso = ParticleSwarm::new(scenario::<Fix16>(n), Sphere).unwrap();
                    black_box(pso.optimize().unwrap())
                })
            },
        );
    }
    group.finish();
}

fn bench_fixed_mul(c: &mut Criterion) {
    let a = Fix16::from_f64(1.2345);
    let b = Fix16::from_f64(-3.75);
    c.bench_function("fix16_mul", |bench| {
        bench.iter(|| black_box(a).wrapping_mul(black_box(b)))
    });
}

criterion_group!(benches, bench_sphere, bench_fixed_mul);
criterion_main!(benches);
