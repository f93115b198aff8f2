//! # Pipeline Benchmarks
//!
//! Measures thread spawn and channel hand-off cost of the concurrent adapter.
//!
//! Run: `cargo bench --bench pipeline_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use intcode_core::prelude::*;
use intcode_orchestration::{Pipeline, Topology};

const FEEDBACK_AMPLIFIER: &str = "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,\
27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5";

const ECHO: &str = "3,0,4,0,99";

/// Benchmark spawn + echo round trip
fn bench_spawn_echo(c: &mut Criterion) {
    let program = Program::parse(ECHO).unwrap();

    c.bench_function("spawn_echo", |b| {
        b.iter(|| {
            let handle = Machine::from_program(&program).unwrap().spawn().unwrap();
            handle.send(black_box(7)).unwrap();
            black_box(handle.receive().unwrap())
        })
    });
}

/// Benchmark feedback ring of increasing size
fn bench_ring(c: &mut Criterion) {
    let program = Program::parse(FEEDBACK_AMPLIFIER).unwrap();
    let mut group = c.benchmark_group("ring");

    for size in [2usize, 5, 10] {
        let phases: Vec<i64> = (0..size as i64).map(|i| 5 + i % 5).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &phases, |b, phases| {
            b.iter(|| {
                black_box(Pipeline::run_phases(program.clone(), phases, Topology::Ring, 0).unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_spawn_echo, bench_ring);
criterion_main!(benches);
