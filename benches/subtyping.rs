//! Rule-evaluation cost of both checkers on the generated families.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fastrand::Rng;
use session_subtyping::{
    generate::{exponential_counterexample, random_isomorphic_type, random_type, GeneratorConfig},
    unfold_once, Algorithm, CancelFlag,
};

/// Inductive grows exponentially in k, so the range stays small.
fn bench_exponential(c: &mut Criterion) {
    let mut group = c.benchmark_group("exponential");
    let cancel = CancelFlag::new();
    for k in 1..=5 {
        let (left, right) = (exponential_counterexample(k), exponential_counterexample(k + 1));
        for algorithm in Algorithm::ALL {
            group.bench_with_input(BenchmarkId::new(algorithm.name(), k), &k, |b, _| {
                b.iter(|| algorithm.subtype(black_box(&left), black_box(&right), &cancel))
            });
        }
    }
    group.finish();
}

fn bench_isomorphic(c: &mut Criterion) {
    let mut group = c.benchmark_group("isomorphic");
    let cancel = CancelFlag::new();
    let mut rng = Rng::with_seed(42);
    for nodes in [10, 50, 100] {
        let left = random_isomorphic_type(nodes, &mut rng);
        let right = random_isomorphic_type(nodes, &mut rng);
        for algorithm in Algorithm::ALL {
            group.bench_with_input(BenchmarkId::new(algorithm.name(), nodes), &nodes, |b, _| {
                b.iter(|| algorithm.subtype(black_box(&left), black_box(&right), &cancel))
            });
        }
    }
    group.finish();
}

fn bench_unfolded(c: &mut Criterion) {
    let mut group = c.benchmark_group("unfolded");
    let cancel = CancelFlag::new();
    let config = GeneratorConfig { max_size: 200, ..GeneratorConfig::default() };
    let mut rng = Rng::with_seed(42);
    let ty = random_type(&config, &mut rng);
    let unfolded = unfold_once(&ty);
    for algorithm in Algorithm::ALL {
        group.bench_function(algorithm.name(), |b| {
            b.iter(|| algorithm.subtype(black_box(&ty), black_box(&unfolded), &cancel))
        });
    }
    group.bench_function("unfold_once", |b| b.iter(|| unfold_once(black_box(&ty))));
    group.finish();
}

criterion_group!(benches, bench_exponential, bench_isomorphic, bench_unfolded);
criterion_main!(benches);
