// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Process-lifetime query state.
//!
//! The similarity graph, the closeness scores, and the book-info map are
//! loaded once and never mutated; queries share them behind an `Arc`.
//! Rebuilding means loading a fresh context and swapping the `Arc` — readers
//! mid-query keep the context they started with.
//!
//! Loading degrades instead of failing: a missing or unreadable graph leaves
//! an empty graph (no suggestions), missing scores leave closeness ranking
//! to silently fall back to occurrence ranking. Either way keyword and regex
//! search keep working.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::corpus;
use crate::graph::SimilarityGraph;
use crate::store;

/// Immutable shared state for the query pipeline.
#[derive(Debug, Default)]
pub struct SearchContext {
    book_info: HashMap<String, String>,
    graph: SimilarityGraph,
    scores: HashMap<String, f64>,
}

impl SearchContext {
    /// A context with no graph, no scores, and no titles. Queries against it
    /// still serve keyword/regex results.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_parts(
        book_info: HashMap<String, String>,
        graph: SimilarityGraph,
        scores: HashMap<String, f64>,
    ) -> Self {
        Self {
            book_info,
            graph,
            scores,
        }
    }

    /// Load graph, scores, and titles, degrading on every failure.
    pub fn load(store_dir: &Path, corpus_dir: Option<&Path>) -> Self {
        let graph = match store::load_graph(store_dir) {
            Ok(graph) => graph,
            Err(e) => {
                warn!(error = %e, "similarity graph unavailable; suggestions disabled");
                SimilarityGraph::new()
            }
        };

        let scores = match store::load_scores(store_dir) {
            Ok(scores) => scores,
            Err(e) => {
                warn!(error = %e, "closeness scores unavailable; falling back to occurrence ranking");
                HashMap::new()
            }
        };

        let book_info = match corpus_dir {
            Some(dir) => match corpus::book_info(dir) {
                Ok(info) => info,
                Err(e) => {
                    warn!(error = %e, "corpus unreadable; titles will be placeholders");
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        Self {
            book_info,
            graph,
            scores,
        }
    }

    pub fn graph(&self) -> &SimilarityGraph {
        &self.graph
    }

    /// True when closeness ranking has data to work with.
    pub fn has_scores(&self) -> bool {
        !self.scores.is_empty()
    }

    /// Closeness score for a book; unknown books score 0.
    pub fn closeness(&self, book_id: &str) -> f64 {
        self.scores.get(book_id).copied().unwrap_or(0.0)
    }

    /// Display title for a book id, with the placeholder the UI expects when
    /// the corpus map has no entry.
    pub fn title_for(&self, book_id: &str) -> String {
        self.book_info
            .get(book_id)
            .cloned()
            .unwrap_or_else(|| format!("Book {}", book_id))
    }
}
