//! # Machine Benchmarks
//!
//! Measures decode and execution throughput of the synchronous adapter.
//!
//! Run: `cargo bench --bench machine_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use intcode_core::prelude::*;
use intcode_core::{Decoded, Memory};

/// Conta de n até 0: 4 instruções por volta
fn countdown(n: i64) -> Program {
    Program::parse(&format!("1101,0,{n},20,1001,20,-1,20,1005,20,4,99")).unwrap()
}

const QUINE: &str = "109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99";

/// Benchmark decode of common instruction words
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    let mut memory = Memory::new(64);
    memory.load(&[21101, 1000, 234, 3, 1005, 20, 4, 99]).unwrap();

    group.bench_function("add_relative", |b| {
        b.iter(|| black_box(Decoded::fetch(&memory, black_box(0))))
    });

    group.bench_function("jump", |b| {
        b.iter(|| black_box(Decoded::fetch(&memory, black_box(4))))
    });

    group.finish();
}

/// Benchmark loop execution
fn bench_countdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("countdown");

    for n in [1_000i64, 10_000, 100_000] {
        let program = countdown(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &program, |b, program| {
            b.iter(|| {
                let mut machine = Machine::from_program(program).unwrap();
                black_box(machine.run_collect([]).unwrap())
            })
        });
    }

    group.finish();
}

/// Benchmark output-heavy program
fn bench_quine(c: &mut Criterion) {
    let program = Program::parse(QUINE).unwrap();

    c.bench_function("quine", |b| {
        b.iter(|| {
            let mut machine = Machine::from_program(&program).unwrap();
            black_box(machine.run_collect([]).unwrap())
        })
    });
}

/// Benchmark machine creation (memory allocation dominates)
fn bench_creation(c: &mut Criterion) {
    let program = Program::parse(QUINE).unwrap();
    let mut group = c.benchmark_group("creation");

    for size in [1024usize, 65536] {
        let config = MachineConfig::default().with_memory_size(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &config, |b, config| {
            b.iter(|| black_box(Machine::with_program(&program, config.clone()).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_countdown, bench_quine, bench_creation);
criterion_main!(benches);
