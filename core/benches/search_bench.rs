use criterion::{criterion_group, criterion_main, Criterion};
use lexindex::{Category, InputDocument, RetrievalIndex};

fn corpus() -> Vec<InputDocument> {
    let sources = [
        ("index.rs", include_str!("../src/index.rs")),
        ("search.rs", include_str!("../src/search.rs")),
        ("persist.rs", include_str!("../src/persist.rs")),
        ("retrieval.rs", include_str!("../src/retrieval.rs")),
        ("tokenizer.rs", include_str!("../src/tokenizer.rs")),
    ];
    (0..40)
        .flat_map(|i| sources.iter().map(move |(name, text)| InputDocument::new(format!("copy_{i}/{name}"), *text, Category::Code)))
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let docs = corpus();
    let index = RetrievalIndex::new();
    c.bench_function("create_index_200_files", |b| b.iter(|| index.create_index(&docs)));
}

fn bench_search(c: &mut Criterion) {
    let index = RetrievalIndex::new();
    index.create_index(&corpus());
    c.bench_function("search_snapshot_query", |b| b.iter(|| index.search("snapshot idf metadata", 3)));
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
