//! Criterion benchmarks for the staircase division.
//! Agent counts: n in {2, 4, 8}; fixed seeded instances.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fairsquare::prelude::*;
use fairsquare::sampling::{draw_point_cloud, CloudCfg, ReplayToken};

fn instance(agents: usize, points: usize, seed: u64) -> Vec<AgentPoints> {
    let cfg = CloudCfg {
        points,
        grid: 1.0,
        ..CloudCfg::default()
    };
    (0..agents)
        .map(|i| AgentPoints {
            points: draw_point_cloud(
                cfg,
                ReplayToken {
                    seed,
                    index: i as u64,
                },
            ),
            color: Some(format!("c{i}")),
        })
        .collect()
}

fn bench_division(c: &mut Criterion) {
    let mut group = c.benchmark_group("half_proportional_division");
    for &n in &[2usize, 4, 8] {
        let agents = instance(n, 24, 43);
        let open_north = Envelope::new(0.0, 0.0, 400.0, f64::INFINITY);
        group.bench_with_input(BenchmarkId::new("three_walls", n), &n, |b, _| {
            b.iter(|| half_proportional_division(&agents, &open_north, 1.0).unwrap())
        });
        let bounded = Envelope::new(0.0, 0.0, 400.0, 400.0);
        group.bench_with_input(BenchmarkId::new("four_walls", n), &n, |b, _| {
            b.iter(|| half_proportional_division(&agents, &bounded, 1.0).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_division);
criterion_main!(benches);
