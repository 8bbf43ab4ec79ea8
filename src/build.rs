// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Offline build pipelines for the index and the similarity graph.
//!
//! Both pipelines walk the corpus directory, fan the per-book work out with
//! rayon when the `parallel` feature is on, and report progress so you know
//! nothing has hung. The expensive parts are embarrassingly parallel: reading
//! and tokenizing books for the index, and the pairwise Jaccard computation
//! for the graph.
//!
//! A book that cannot be read is skipped with a warning and the build
//! continues; a store failure while emitting records aborts the build.

use std::collections::{HashMap, HashSet};
use std::path::Path;

#[cfg(feature = "parallel")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::warn;

use crate::centrality::closeness_scores;
use crate::corpus::{self, BookFile};
use crate::graph::{book_vocabulary, build_similarity_graph};
use crate::inverted::{count_terms, InvertedIndex};
use crate::store::{self, IndexStore, JsonlIndexStore};
use crate::types::Tuning;

/// Summary of an index build.
#[derive(Debug)]
pub struct IndexBuildStats {
    pub books_indexed: usize,
    pub books_skipped: usize,
    pub terms: usize,
    pub records_written: usize,
    pub split_terms: Vec<String>,
}

/// Summary of a graph build.
#[derive(Debug)]
pub struct GraphBuildStats {
    pub nodes: usize,
    pub edges: usize,
    pub isolated: usize,
}

#[cfg(feature = "parallel")]
fn progress_bar(len: usize, prefix: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:<10} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
        )
        .unwrap()
        .progress_chars("━━╸"),
    );
    pb.set_prefix(prefix);
    pb
}

/// Rebuild the inverted index from the corpus into `store`.
///
/// The previous records are dropped first; the emitted state is a fresh
/// build, never a mix of old and new.
pub fn run_index_build(
    corpus_dir: &Path,
    store: &mut JsonlIndexStore,
    tuning: &Tuning,
) -> Result<IndexBuildStats, String> {
    let books = corpus::scan_corpus(corpus_dir)
        .map_err(|e| format!("failed to read corpus directory {}: {}", corpus_dir.display(), e))?;

    let (index, skipped) = accumulate_counts(&books);

    store
        .clear()
        .map_err(|e| format!("failed to drop previous index: {}", e))?;

    let books_indexed = index.books_indexed();
    let terms = index.term_count();
    let stats = index
        .emit(store, tuning.max_postings_per_record)
        .map_err(|e| format!("failed to write index records: {}", e))?;

    Ok(IndexBuildStats {
        books_indexed,
        books_skipped: skipped,
        terms,
        records_written: stats.records_written,
        split_terms: stats.split_terms,
    })
}

/// Rebuild the similarity graph and closeness scores from the corpus,
/// persisting both into `store_dir`.
pub fn run_graph_build(
    corpus_dir: &Path,
    store_dir: &Path,
    tuning: &Tuning,
) -> Result<GraphBuildStats, String> {
    let books = corpus::scan_corpus(corpus_dir)
        .map_err(|e| format!("failed to read corpus directory {}: {}", corpus_dir.display(), e))?;

    let vocabularies = collect_vocabularies(&books);

    let graph = build_similarity_graph(&vocabularies, tuning.jaccard_threshold);
    let scores = closeness_scores(&graph);

    store::save_graph(store_dir, &graph).map_err(|e| format!("failed to write graph: {}", e))?;
    store::save_scores(store_dir, &scores)
        .map_err(|e| format!("failed to write scores: {}", e))?;

    let isolated = graph
        .nodes()
        .filter(|id| graph.neighbors(id).is_some_and(HashMap::is_empty))
        .count();

    Ok(GraphBuildStats {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        isolated,
    })
}

/// Read and tokenize every book, folding counts into one accumulator.
/// Returns the accumulator and the number of skipped (unreadable) books.
#[cfg(feature = "parallel")]
fn accumulate_counts(books: &[BookFile]) -> (InvertedIndex, usize) {
    let pb = progress_bar(books.len(), "Indexing");
    let per_book: Vec<Option<(String, HashMap<String, u64>)>> = books
        .par_iter()
        .map(|book| {
            let result = match book.read() {
                Ok(content) => Some((book.id.clone(), count_terms(&content))),
                Err(e) => {
                    warn!(book = %book.id, error = %e, "skipping unreadable book");
                    None
                }
            };
            pb.inc(1);
            result
        })
        .collect();
    pb.finish_with_message("tokenized");

    merge_per_book(per_book)
}

#[cfg(not(feature = "parallel"))]
fn accumulate_counts(books: &[BookFile]) -> (InvertedIndex, usize) {
    let per_book: Vec<Option<(String, HashMap<String, u64>)>> = books
        .iter()
        .map(|book| match book.read() {
            Ok(content) => Some((book.id.clone(), count_terms(&content))),
            Err(e) => {
                warn!(book = %book.id, error = %e, "skipping unreadable book");
                None
            }
        })
        .collect();

    merge_per_book(per_book)
}

fn merge_per_book(per_book: Vec<Option<(String, HashMap<String, u64>)>>) -> (InvertedIndex, usize) {
    let mut index = InvertedIndex::new();
    let mut skipped = 0;
    for item in per_book {
        match item {
            Some((book_id, counts)) => index.absorb_counts(&book_id, counts),
            None => skipped += 1,
        }
    }
    (index, skipped)
}

/// Read every book into its vocabulary set. Unreadable books are skipped.
#[cfg(feature = "parallel")]
fn collect_vocabularies(books: &[BookFile]) -> HashMap<String, HashSet<String>> {
    let pb = progress_bar(books.len(), "Reading");
    let vocabularies = books
        .par_iter()
        .filter_map(|book| {
            let result = match book.read() {
                Ok(content) => Some((book.id.clone(), book_vocabulary(&content))),
                Err(e) => {
                    warn!(book = %book.id, error = %e, "skipping unreadable book");
                    None
                }
            };
            pb.inc(1);
            result
        })
        .collect();
    pb.finish_with_message("vocabularies ready");
    vocabularies
}

#[cfg(not(feature = "parallel"))]
fn collect_vocabularies(books: &[BookFile]) -> HashMap<String, HashSet<String>> {
    books
        .iter()
        .filter_map(|book| match book.read() {
            Ok(content) => Some((book.id.clone(), book_vocabulary(&content))),
            Err(e) => {
                warn!(book = %book.id, error = %e, "skipping unreadable book");
                None
            }
        })
        .collect()
}
