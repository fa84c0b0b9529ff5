//! Benchmarks for noise sampling and the query path
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dp_count_core::{
    DpQuerier, LaplaceMechanism, NoiseMechanism, QuerierConfig, Rating, RatingPredicate,
    RatingsDataset,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;

fn bench_sampling(c: &mut Criterion) {
    let mut mechanism = LaplaceMechanism::with_rng(ChaCha20Rng::seed_from_u64(1));

    c.bench_function("laplace_sample", |b| {
        b.iter(|| mechanism.sample(black_box(0.5), black_box(1.0)))
    });
}

fn bench_get_count(c: &mut Criterion) {
    let ratings: Vec<Rating> = (0..10_000)
        .map(|i| Rating {
            user: format!("user{}@example.com", i),
            movie: if i % 3 == 0 { "Ran" } else { "Ikiru" }.to_string(),
            date: "2021-01-01".to_string(),
            stars: (i % 5 + 1) as u8,
        })
        .collect();
    let dataset = Arc::new(RatingsDataset::from_ratings(ratings));
    let predicate = RatingPredicate::new("Ran", 3);

    c.bench_function("get_count_10k_rows", |b| {
        b.iter_batched(
            || {
                let noise = LaplaceMechanism::with_rng(ChaCha20Rng::seed_from_u64(2));
                DpQuerier::with_mechanism(dataset.clone(), QuerierConfig::new(1.0), noise).unwrap()
            },
            |querier| querier.get_count(black_box(&predicate), 0.5),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_sampling, bench_get_count);
criterion_main!(benches);
