//! Full-text search over a corpus of Project Gutenberg books.
//!
//! Two query flavors run against an inverted index: exact keywords (with a
//! KMP substring fallback when exact hits are sparse) and a restricted regex
//! dialect compiled to a DFA. Results rank by raw occurrence or by closeness
//! centrality in a Jaccard similarity graph over book vocabularies, and the
//! same graph drives "similar book" suggestions.
//!
//! # Architecture
//!
//! ```text
//! offline                                  query time
//! ───────                                  ──────────
//! corpus ─▶ tokenize ─▶ inverted ─▶ store  keyword ─▶ store.get_term ─┐
//!    │                                     keyword ─▶ kmp scan ───────┤
//!    └─▶ graph (Jaccard) ─▶ centrality     regex ──▶ regex::Dfa scan ─┤
//!              │                │                                     ▼
//!              └────────────────┴──▶ store ─▶ context ─▶ query ─▶ results
//!                                                          │        + suggestions
//!                                                          └─ graph neighbors
//! ```
//!
//! The store is abstract ([`IndexStore`]); the bundled implementations are an
//! in-memory map and a JSONL file. The graph, scores, and book titles load
//! once into a [`SearchContext`] shared immutably by all queries.
//!
//! # Usage
//!
//! ```ignore
//! use folio::{build_inverted_index, MemoryIndexStore, QueryRequest, SearchContext, Searcher};
//!
//! let index = build_inverted_index(books);
//! let mut store = MemoryIndexStore::new();
//! index.emit(&mut store, 500)?;
//!
//! let context = SearchContext::empty();
//! let searcher = Searcher::new(&store, &context);
//! let response = searcher.query(&QueryRequest {
//!     keyword: Some("alice".into()),
//!     ..QueryRequest::default()
//! });
//! ```

// Module declarations
pub mod build;
pub mod centrality;
pub mod context;
pub mod corpus;
pub mod graph;
pub mod inverted;
pub mod kmp;
pub mod query;
pub mod regex;
pub mod store;
pub mod tokenize;
pub mod types;

// Re-exports for public API
pub use build::{run_graph_build, run_index_build, GraphBuildStats, IndexBuildStats};
pub use centrality::closeness_scores;
pub use context::SearchContext;
pub use corpus::{book_info, parse_book_filename, scan_corpus, BookFile};
pub use graph::{book_vocabulary, build_similarity_graph, jaccard, SimilarityGraph};
pub use inverted::{build_inverted_index, count_terms, EmitStats, InvertedIndex};
pub use kmp::KmpPattern;
pub use query::Searcher;
pub use regex::{compile as compile_regex, Dfa, RegexError};
pub use store::{
    load_graph, load_scores, save_graph, save_scores, IndexStore, JsonlIndexStore,
    MemoryIndexStore, RecordScan, StoreError, BOOKS_INDEX_FILE, GRAPH_FILE, SCORES_FILE,
};
pub use types::{
    GraphRecord, IndexRecord, Postings, QueryRequest, QueryResponse, Ranking, RankingMethod,
    ScoreRecord, SearchHit, Suggestion, Tuning,
};
