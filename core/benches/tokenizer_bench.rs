use criterion::{criterion_group, criterion_main, Criterion};
use tfidf_core::tokenizer::tokenize;
use tfidf_core::{search, IndexSnapshot};

const SAMPLE: &str = "Rust is a multi-paradigm, general-purpose programming language that \
emphasizes performance, type safety, and concurrency. It enforces memory safety, meaning \
that all references point to valid memory, without a garbage collector.";

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_sample", |b| b.iter(|| tokenize(SAMPLE)));
}

fn bench_search(c: &mut Criterion) {
    let texts: Vec<String> = (0..1_000).map(|i| format!("{SAMPLE} doc{i} topic{}", i % 17)).collect();
    let index = IndexSnapshot::build(texts.iter().enumerate().map(|(i, t)| (i as u32, t.as_str())));
    c.bench_function("build_1k", |b| {
        b.iter(|| IndexSnapshot::build(texts.iter().enumerate().map(|(i, t)| (i as u32, t.as_str()))))
    });
    c.bench_function("search_1k", |b| b.iter(|| search(&index, "memory safety topic3", 10)));
}

criterion_group!(benches, bench_tokenize, bench_search);
criterion_main!(benches);
