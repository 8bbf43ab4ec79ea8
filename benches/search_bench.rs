//! Benchmarks for the hot paths: regex compilation, term scans, and the
//! pairwise graph build.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;

use folio::{
    build_inverted_index, build_similarity_graph, closeness_scores, compile_regex, KmpPattern,
    MemoryIndexStore, QueryRequest, RankingMethod, SearchContext, Searcher,
};

/// Deterministic pseudo-vocabulary: `w<n>` with shared low-numbered words.
fn synthetic_books(count: usize, words_per_book: usize) -> Vec<(String, String)> {
    (0..count)
        .map(|book| {
            let words: Vec<String> = (0..words_per_book)
                .map(|w| format!("w{}", (book * 7 + w * 13) % (words_per_book * 2)))
                .collect();
            (book.to_string(), words.join(" "))
        })
        .collect()
}

fn bench_regex_compile(c: &mut Criterion) {
    c.bench_function("regex_compile", |b| {
        b.iter(|| compile_regex(black_box("(al|ic)*e..(x|y|z)*")).unwrap())
    });
}

fn bench_regex_scan(c: &mut Criterion) {
    let dfa = compile_regex("al.*e").unwrap();
    let terms: Vec<String> = (0..10_000).map(|i| format!("term{}alike{}", i, i % 97)).collect();
    c.bench_function("regex_scan_10k_terms", |b| {
        b.iter(|| {
            terms
                .iter()
                .filter(|t| dfa.matches_partial(black_box(t)))
                .count()
        })
    });
}

fn bench_kmp_scan(c: &mut Criterion) {
    let pattern = KmpPattern::new("zzz");
    let terms: Vec<String> = (0..10_000).map(|i| format!("puzzle{}buz{}", i, i % 89)).collect();
    c.bench_function("kmp_scan_10k_terms", |b| {
        b.iter(|| {
            terms
                .iter()
                .filter(|t| pattern.matches(black_box(t)))
                .count()
        })
    });
}

fn bench_keyword_query(c: &mut Criterion) {
    let mut store = MemoryIndexStore::new();
    build_inverted_index(synthetic_books(200, 300))
        .emit(&mut store, 500)
        .unwrap();
    let context = SearchContext::empty();
    let searcher = Searcher::new(&store, &context);
    let request = QueryRequest {
        keyword: Some("w42".to_string()),
        regex: None,
        ranking: RankingMethod::Occurrence,
    };

    c.bench_function("keyword_query", |b| {
        b.iter(|| searcher.query(black_box(&request)))
    });
}

fn bench_graph_build(c: &mut Criterion) {
    let vocabularies: HashMap<_, _> = synthetic_books(100, 200)
        .into_iter()
        .map(|(id, content)| (id, folio::book_vocabulary(&content)))
        .collect();

    c.bench_function("graph_build_100_books", |b| {
        b.iter(|| build_similarity_graph(black_box(&vocabularies), 0.01))
    });

    let graph = build_similarity_graph(&vocabularies, 0.01);
    c.bench_function("closeness_100_books", |b| {
        b.iter(|| closeness_scores(black_box(&graph)))
    });
}

criterion_group!(
    benches,
    bench_regex_compile,
    bench_regex_scan,
    bench_kmp_scan,
    bench_keyword_query,
    bench_graph_build,
);
criterion_main!(benches);
