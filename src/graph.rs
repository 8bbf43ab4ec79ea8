//! Jaccard similarity graph over book vocabularies.
//!
//! Each book contributes the set of distinct terms in its text. Every
//! unordered pair of books is compared exactly (no sampling, no MinHash);
//! pairs whose Jaccard similarity exceeds the threshold become an undirected
//! weighted edge. Books below the threshold against everything remain in the
//! graph as isolated nodes, which matters for the closeness computation:
//! isolated books must score 0, not disappear.
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! 1. **SYMMETRIC**: `neighbors(a)[b] == neighbors(b)[a]` for every edge
//! 2. **NO_SELF_LOOPS**: no book is its own neighbor
//! 3. **THRESHOLDED**: every stored weight is strictly above the threshold
//! 4. **ORDER_FREE**: the edge set depends only on the vocabulary sets,
//!    never on iteration order

use std::collections::{HashMap, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::tokenize;
use crate::types::GraphRecord;

/// Undirected weighted adjacency over book ids.
#[derive(Debug, Clone, Default)]
pub struct SimilarityGraph {
    adjacency: HashMap<String, HashMap<String, f64>>,
}

impl SimilarityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Undirected edge count (each edge is stored twice).
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(HashMap::len).sum::<usize>() / 2
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    /// Neighbors of `book_id` with their similarity weights. `None` if the
    /// book is not a node at all; an empty map if it is isolated.
    pub fn neighbors(&self, book_id: &str) -> Option<&HashMap<String, f64>> {
        self.adjacency.get(book_id)
    }

    /// Ensure `book_id` exists as a (possibly isolated) node.
    pub fn add_node(&mut self, book_id: &str) {
        self.adjacency.entry(book_id.to_string()).or_default();
    }

    /// Insert a symmetric edge. Self-loops are ignored.
    pub fn add_edge(&mut self, a: &str, b: &str, weight: f64) {
        if a == b {
            return;
        }
        self.adjacency
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string(), weight);
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string(), weight);
    }

    /// Rebuild from persisted records.
    pub fn from_records(records: Vec<GraphRecord>) -> Self {
        let mut adjacency = HashMap::with_capacity(records.len());
        for record in records {
            adjacency.insert(record.book_id, record.neighbors);
        }
        Self { adjacency }
    }

    /// Flatten to records, sorted by book id so rebuilds are byte-identical.
    pub fn to_records(&self) -> Vec<GraphRecord> {
        let mut records: Vec<GraphRecord> = self
            .adjacency
            .iter()
            .map(|(book_id, neighbors)| GraphRecord {
                book_id: book_id.clone(),
                neighbors: neighbors.clone(),
            })
            .collect();
        records.sort_by(|a, b| a.book_id.cmp(&b.book_id));
        records
    }

    /// Check the SYMMETRIC invariant (test/debug helper).
    pub fn is_symmetric(&self) -> bool {
        self.adjacency.iter().all(|(a, neighbors)| {
            neighbors.iter().all(|(b, w)| {
                self.adjacency
                    .get(b)
                    .and_then(|back| back.get(a))
                    .is_some_and(|back_w| back_w == w)
            })
        })
    }
}

/// Distinct terms of one book's text.
pub fn book_vocabulary(content: &str) -> HashSet<String> {
    let lowered = content.to_lowercase();
    tokenize::tokens(&lowered).map(str::to_string).collect()
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`. Zero when both sets are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|term| large.contains(*term)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Build the similarity graph from per-book vocabularies.
///
/// Pairs are enumerated over the sorted id list; with the `parallel` feature
/// the outer loop fans out across threads. Either way the result is a pure
/// function of the vocabulary sets.
pub fn build_similarity_graph(
    vocabularies: &HashMap<String, HashSet<String>>,
    threshold: f64,
) -> SimilarityGraph {
    let mut ids: Vec<&str> = vocabularies.keys().map(String::as_str).collect();
    ids.sort_unstable();

    let mut graph = SimilarityGraph::new();
    for id in &ids {
        graph.add_node(id);
    }

    for (a, b, weight) in pairwise_edges(&ids, vocabularies, threshold) {
        graph.add_edge(a, b, weight);
    }
    graph
}

#[cfg(feature = "parallel")]
fn pairwise_edges<'a>(
    ids: &[&'a str],
    vocabularies: &HashMap<String, HashSet<String>>,
    threshold: f64,
) -> Vec<(&'a str, &'a str, f64)> {
    (0..ids.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let a = ids[i];
            let va = &vocabularies[a];
            ids[i + 1..].iter().filter_map(move |&b| {
                let weight = jaccard(va, &vocabularies[b]);
                (weight > threshold).then_some((a, b, weight))
            })
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn pairwise_edges<'a>(
    ids: &[&'a str],
    vocabularies: &HashMap<String, HashSet<String>>,
    threshold: f64,
) -> Vec<(&'a str, &'a str, f64)> {
    let mut edges = Vec::new();
    for (i, &a) in ids.iter().enumerate() {
        let va = &vocabularies[a];
        for &b in &ids[i + 1..] {
            let weight = jaccard(va, &vocabularies[b]);
            if weight > threshold {
                edges.push((a, b, weight));
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_jaccard_identical_sets() {
        let a = vocab(&["alice", "rabbit", "queen"]);
        assert_eq!(jaccard(&a, &a.clone()), 1.0);
    }

    #[test]
    fn test_jaccard_disjoint_sets() {
        let a = vocab(&["alice"]);
        let b = vocab(&["moby"]);
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        let a = vocab(&["a", "b", "c"]);
        let b = vocab(&["b", "c", "d"]);
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_jaccard_empty_sets() {
        assert_eq!(jaccard(&HashSet::new(), &HashSet::new()), 0.0);
    }

    #[test]
    fn test_identical_vocab_clique_and_isolated_node() {
        let shared = ["whale", "ship", "sea"];
        let vocabularies = HashMap::from([
            ("1".to_string(), vocab(&shared)),
            ("2".to_string(), vocab(&shared)),
            ("3".to_string(), vocab(&shared)),
            ("4".to_string(), vocab(&["completely", "different", "words"])),
        ]);

        let graph = build_similarity_graph(&vocabularies, 0.01);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        for (a, b) in [("1", "2"), ("1", "3"), ("2", "3")] {
            assert_eq!(graph.neighbors(a).unwrap()[b], 1.0);
        }
        assert!(graph.neighbors("4").unwrap().is_empty());
        assert!(graph.is_symmetric());
    }

    #[test]
    fn test_threshold_is_strict() {
        // J = 1/101 < 0.02; with threshold 0.02 no edge appears.
        let mut big_a: HashSet<String> = (0..50).map(|i| format!("a{i}")).collect();
        let mut big_b: HashSet<String> = (0..50).map(|i| format!("b{i}")).collect();
        big_a.insert("shared".to_string());
        big_b.insert("shared".to_string());
        let vocabularies = HashMap::from([
            ("1".to_string(), big_a),
            ("2".to_string(), big_b),
        ]);

        let graph = build_similarity_graph(&vocabularies, 0.02);
        assert_eq!(graph.edge_count(), 0);
        let graph = build_similarity_graph(&vocabularies, 0.001);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_self_loops_excluded() {
        let mut graph = SimilarityGraph::new();
        graph.add_edge("1", "1", 1.0);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_records_roundtrip_sorted() {
        let vocabularies = HashMap::from([
            ("7".to_string(), vocab(&["x", "y"])),
            ("3".to_string(), vocab(&["x", "y"])),
        ]);
        let graph = build_similarity_graph(&vocabularies, 0.01);
        let records = graph.to_records();
        assert_eq!(records[0].book_id, "3");
        assert_eq!(records[1].book_id, "7");

        let back = SimilarityGraph::from_records(records);
        assert_eq!(back.edge_count(), graph.edge_count());
        assert!(back.is_symmetric());
    }

    #[test]
    fn test_book_vocabulary_lowercases_and_dedupes() {
        let v = book_vocabulary("The Whale, the WHALE!");
        assert_eq!(v, vocab(&["the", "whale"]));
    }
}
