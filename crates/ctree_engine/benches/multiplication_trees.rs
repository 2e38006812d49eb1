//! Multiplication-tree benchmark: building Karatsuba and naive limb trees,
//! walking their martingale lengths, and evaluating the limbs exactly.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ctree_engine::{martingale_lengths, operands, EvalOptions, Evaluator, MulAlgorithm};
use ctree_parser::parse;
use std::hint::black_box;

const ALGORITHMS: [MulAlgorithm; 2] = [MulAlgorithm::Naive, MulAlgorithm::Karatsuba];

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_limbs");
    for k in [3u32, 5, 7] {
        let n = 1usize << k;
        let a = operands("a", n);
        let b = operands("b", n);
        for algorithm in ALGORITHMS {
            group.bench_with_input(BenchmarkId::new(algorithm.name(), n), &n, |bench, _| {
                bench.iter(|| algorithm.build(black_box(&a), black_box(&b)))
            });
        }
    }
    group.finish();
}

fn bench_martingale(c: &mut Criterion) {
    let mut group = c.benchmark_group("martingale_lengths");
    for k in [5u32, 7] {
        let n = 1usize << k;
        for algorithm in ALGORITHMS {
            let limbs = algorithm
                .build(&operands("a", n), &operands("b", n))
                .expect("power-of-two operands");
            group.bench_with_input(BenchmarkId::new(algorithm.name(), n), &limbs, |bench, limbs| {
                bench.iter(|| martingale_lengths(black_box(limbs)))
            });
        }
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    group.sample_size(20);

    let value_only = Evaluator::with_options(EvalOptions::value_only());
    for algorithm in ALGORITHMS {
        let limbs = algorithm
            .build(&operands("a", 4), &operands("b", 4))
            .expect("n = 4 is a power of two");
        group.bench_function(BenchmarkId::new(algorithm.name(), "values_n4"), |bench| {
            bench.iter(|| value_only.evaluate_all(black_box(&limbs)))
        });
    }

    let horner = parse("(- (* (- (* (+ (* (+ x 14) x) 47) x) 38) x) 240)").expect("parse horner");
    let evaluator = Evaluator::new();
    group.bench_function("horner_quartic_with_bound", |bench| {
        bench.iter(|| evaluator.evaluate(black_box(&horner)))
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_martingale, bench_evaluate);
criterion_main!(benches);
