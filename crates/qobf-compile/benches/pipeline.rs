//! Benchmarks for obfuscation layering
//!
//! Run with: cargo bench -p qobf-compile

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qobf_compile::{LayerPlan, NullSink, verify_equivalence};
use qobf_ir::{Circuit, QubitId};

fn layered_ghz(n: u32) -> Circuit {
    let mut circuit = Circuit::ghz(n).unwrap();
    for q in 0..n {
        circuit.rz(0.1 * f64::from(q + 1), QubitId(q)).unwrap();
    }
    circuit.measure_all().unwrap();
    circuit
}

/// Benchmark each algorithm alone, without the unitary check
fn bench_single_algorithm(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_algorithm");
    let circuit = layered_ghz(8);

    for spec in [
        "cloaked:probability=1",
        "inverse:density=1,level=heavy",
        "delayed:probability=1",
        "composite:density=1",
    ] {
        let plan = LayerPlan::parse([spec]).unwrap().with_verification(false);
        group.bench_with_input(BenchmarkId::new("apply", spec), &plan, |b, plan| {
            b.iter(|| plan.apply(black_box(&circuit), &mut NullSink).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the full-unitary equivalence check
fn bench_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("verification");

    for n in [2, 4, 6, 8] {
        let circuit = layered_ghz(n);
        let out = LayerPlan::parse(["cloaked:probability=1"])
            .unwrap()
            .with_verification(false)
            .apply(&circuit, &mut NullSink)
            .unwrap();
        group.bench_with_input(BenchmarkId::new("verify", n), &n, |b, _| {
            b.iter(|| verify_equivalence(black_box(&circuit), black_box(&out)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_algorithm, bench_verification);
criterion_main!(benches);
