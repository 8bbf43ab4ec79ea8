// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of the search engine.
//!
//! These types define how index records, graph records, and query results fit
//! together. The on-disk JSON shapes here are the contract between the offline
//! builders (`folio index`, `folio graph`) and the query pipeline, so changing
//! a field name is a store-format change.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **IndexRecord**: `books` is non-empty and every count is ≥ 1. A record is
//!   identified by `(term, part)`; chunks of one term never share a book id.
//! - **GraphRecord**: weights lie in `(0.01, 1]` and the edge set is
//!   symmetric — if `a` lists `b` at weight `w`, `b` lists `a` at `w`.
//! - **ScoreRecord**: `closeness ≥ 0`, with `0` for isolated books.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Per-term postings: book id → occurrence count (always ≥ 1).
pub type Postings = HashMap<String, u64>;

/// One physical index record.
///
/// Most terms fit in a single record (`part = 0`). Terms that occur in more
/// than `Tuning::max_postings_per_record` books are split into several
/// records whose `books` chunks partition the logical postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub term: String,
    pub part: u32,
    pub books: Postings,
}

/// One book's adjacency in the similarity graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub book_id: String,
    pub neighbors: HashMap<String, f64>,
}

/// One book's closeness centrality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub book_id: String,
    pub closeness: f64,
}

/// Knobs shared by the builder and the query pipeline.
///
/// The defaults are the production values; tests shrink them to exercise the
/// splitting and fallback paths without thousand-book fixtures.
#[derive(Debug, Clone)]
pub struct Tuning {
    /// Postings per physical record before a term is split into parts.
    pub max_postings_per_record: usize,
    /// Jaccard similarity below or at this value produces no edge.
    pub jaccard_threshold: f64,
    /// Keyword path: fewer exact postings than this triggers the KMP scan.
    pub exact_hit_floor: usize,
    /// How many top-ranked results seed the suggestion expansion.
    pub suggestion_seeds: usize,
    /// Cap on the suggestion list.
    pub max_suggestions: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_postings_per_record: 500,
            jaccard_threshold: 0.01,
            exact_hit_floor: 8,
            suggestion_seeds: 3,
            max_suggestions: 5,
        }
    }
}

/// How query results are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMethod {
    /// Raw occurrence count, descending.
    #[default]
    Occurrence,
    /// Closeness centrality of the book in the similarity graph, descending.
    Closeness,
}

impl FromStr for RankingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "occurrence" => Ok(RankingMethod::Occurrence),
            "closeness" => Ok(RankingMethod::Closeness),
            other => Err(format!(
                "unknown ranking method '{other}' (expected 'occurrence' or 'closeness')"
            )),
        }
    }
}

/// The score attached to a hit, shaped by the ranking method in effect.
///
/// Occurrence-ranked results only carry a count; closeness-ranked results
/// additionally carry the centrality score. Keeping this a sum type (rather
/// than an always-present `Option<f64>`) lets the JSON output omit
/// `centrality_score` entirely for occurrence queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Ranking {
    Occurrence {
        count: u64,
    },
    Closeness {
        count: u64,
        #[serde(rename = "centrality_score")]
        score: f64,
    },
}

impl Ranking {
    /// Occurrence count regardless of variant.
    pub fn count(&self) -> u64 {
        match *self {
            Ranking::Occurrence { count } | Ranking::Closeness { count, .. } => count,
        }
    }

    /// Centrality score, if this hit was closeness-ranked.
    pub fn centrality(&self) -> Option<f64> {
        match *self {
            Ranking::Occurrence { .. } => None,
            Ranking::Closeness { score, .. } => Some(score),
        }
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub ranking: Ranking,
}

impl SearchHit {
    pub fn count(&self) -> u64 {
        self.ranking.count()
    }
}

/// A "similar book" produced by expanding top results through the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    pub similarity: f64,
}

/// A user query: at most one keyword and one regex, plus the ranking method.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub keyword: Option<String>,
    pub regex: Option<String>,
    pub ranking: RankingMethod,
}

/// Everything a query produces.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub results_keyword: Vec<SearchHit>,
    pub results_regex: Vec<SearchHit>,
    pub suggestions: Vec<Suggestion>,
}
