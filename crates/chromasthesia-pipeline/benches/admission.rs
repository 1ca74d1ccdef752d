//! Benchmarks for the hot synchronous paths: queue admission accounting and
//! query building.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chromasthesia_core::config::QuerySettings;
use chromasthesia_core::palette::StaticPalette;
use chromasthesia_core::types::{AffectWord, Emotion, EmotionVector, EmotionWeights};
use chromasthesia_pipeline::{CompletionQueue, QueryBuilder};

fn bench_queue_churn(c: &mut Criterion) {
    c.bench_function("queue_admit_complete_release_64", |b| {
        b.iter(|| {
            let queue: CompletionQueue<u32, u32> = CompletionQueue::new(
                8,
                (0..64).collect(),
                Box::new(|results| {
                    black_box(results.len());
                }),
            );
            let mut pending = Vec::new();
            while let Some(item) = queue.poll() {
                pending.push(item);
            }
            while let Some(item) = pending.pop() {
                let _ = queue.complete_with(black_box(item));
                pending.extend(queue.release());
            }
        });
    });
}

fn bench_query_build(c: &mut Criterion) {
    let builder = QueryBuilder::new(Arc::new(StaticPalette::new()), QuerySettings::default());
    let vector = EmotionVector {
        dominant: Emotion::Sadness,
        intensity: 0.64,
        words: vec![
            AffectWord {
                word: "grief".to_string(),
                weights: EmotionWeights::new([0.0, 0.9, 0.0, 0.1, 0.0, 0.0]),
            },
            AffectWord {
                word: "lonely".to_string(),
                weights: EmotionWeights::new([0.0, 0.8, 0.0, 0.1, 0.0, 0.0]),
            },
            AffectWord {
                word: "rain".to_string(),
                weights: EmotionWeights::new([0.0, 0.4, 0.0, 0.0, 0.0, 0.0]),
            },
        ],
    };

    c.bench_function("query_build_sad_vector", |b| {
        b.iter(|| {
            let query = builder
                .build(black_box(&vector), black_box("a gathering storm"), &[])
                .unwrap();
            black_box(query.to_query_string());
        });
    });
}

criterion_group!(benches, bench_queue_churn, bench_query_build);
criterion_main!(benches);
