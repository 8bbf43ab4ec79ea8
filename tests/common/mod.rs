//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use folio::{run_graph_build, run_index_build, JsonlIndexStore, Tuning};

/// Write `<id>_<title>.txt` book files into a corpus directory.
pub fn write_corpus(dir: &Path, books: &[(&str, &str, &str)]) {
    for (id, title, content) in books {
        fs::write(dir.join(format!("{}_{}.txt", id, title)), content).unwrap();
    }
}

/// Run both offline builds (index + graph/scores) over a corpus.
pub fn build_stores(corpus: &Path, store_dir: &Path) -> JsonlIndexStore {
    let mut store = JsonlIndexStore::open_dir(store_dir).unwrap();
    run_index_build(corpus, &mut store, &Tuning::default()).unwrap();
    run_graph_build(corpus, store_dir, &Tuning::default()).unwrap();
    store
}

/// A word repeated `n` times, space separated.
pub fn repeated(word: &str, n: usize) -> String {
    vec![word; n].join(" ")
}
