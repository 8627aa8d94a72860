//! Criterion benchmarks for Sardonic.
//!
//! Covers the hot paths of a pipeline run:
//! - Text normalization (single and batch)
//! - Vocabulary fitting and bag-of-words transformation
//! - Logistic regression training and bundle prediction

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use sardonic::analysis::normalizer::{NormalizedText, TextNormalizer};
use sardonic::ml::bundle::ModelBundle;
use sardonic::ml::logistic::{LogisticRegression, LogisticRegressionConfig};
use sardonic::ml::vectorizer;

/// Generate headline-like raw texts with some markup and punctuation.
fn generate_headlines(count: usize) -> Vec<String> {
    let words = [
        "area", "man", "local", "nation", "senate", "report", "study", "finds",
        "can't", "won't", "thrilled", "budget", "débâcle", "<b>breaking</b>", "new",
        "finally", "congress", "scientists", "city", "council", "announces", "plan",
        "don't", "déjà", "vu", "again!!", "<script>x()</script>", "approves", "funding",
    ];

    (0..count)
        .map(|i| {
            let len = 6 + (i % 9);
            (0..len)
                .map(|j| words[(i * 7 + j * 13) % words.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn normalized_corpus(count: usize) -> (Vec<NormalizedText>, Vec<bool>) {
    let normalizer = TextNormalizer::default();
    let texts = normalizer.normalize_all(&generate_headlines(count));
    let labels = (0..count).map(|i| i % 3 == 0).collect();
    (texts, labels)
}

/// Benchmark the normalization pipeline.
fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalization");

    let normalizer = TextNormalizer::default();
    let headlines = generate_headlines(1000);

    group.bench_function("normalize_single", |b| {
        b.iter(|| black_box(normalizer.normalize(black_box(&headlines[0]))))
    });

    group.throughput(Throughput::Elements(headlines.len() as u64));
    group.bench_function("normalize_all", |b| {
        b.iter(|| black_box(normalizer.normalize_all(black_box(&headlines))))
    });

    group.finish();
}

/// Benchmark vocabulary fitting and feature extraction.
fn bench_vectorization(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorization");

    let (texts, _) = normalized_corpus(5000);
    let vocabulary = vectorizer::fit(&texts);

    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("fit", |b| b.iter(|| black_box(vectorizer::fit(black_box(&texts)))));
    group.bench_function("transform", |b| {
        b.iter(|| black_box(vectorizer::transform(black_box(&texts), &vocabulary)))
    });

    group.finish();
}

/// Benchmark classifier training and bundle prediction.
fn bench_classifier(c: &mut Criterion) {
    let mut group = c.benchmark_group("classifier");
    group.sample_size(20);

    let (texts, labels) = normalized_corpus(2000);
    let (_, features) = vectorizer::fit_transform(&texts);
    let config = LogisticRegressionConfig {
        max_iter: 50,
        ..LogisticRegressionConfig::default()
    };

    group.bench_function("fit_50_iterations", |b| {
        b.iter(|| black_box(LogisticRegression::fit(&config, black_box(&features), &labels)))
    });

    let bundle = ModelBundle::train(&texts, &labels, &config).unwrap();
    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("bundle_predict", |b| {
        b.iter(|| black_box(bundle.predict(black_box(&texts))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_normalization,
    bench_vectorization,
    bench_classifier
);

criterion_main!(benches);
