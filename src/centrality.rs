//! Weighted closeness centrality over the similarity graph.
//!
//! Similar books should be *close*, so an edge of weight `w` has traversal
//! length `1 / w`: a pair sharing most of its vocabulary is one short hop
//! apart. For every source we run Dijkstra and score
//!
//! ```text
//! closeness(s) = (reachable(s) - 1) / Σ d(s, v)
//! ```
//!
//! where `reachable(s)` counts the source's connected component (including
//! itself). Isolated books, and degenerate components whose distances sum to
//! zero, score 0.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::graph::SimilarityGraph;

/// Closeness centrality for every node in the graph.
pub fn closeness_scores(graph: &SimilarityGraph) -> HashMap<String, f64> {
    let mut ids: Vec<&str> = graph.nodes().collect();
    ids.sort_unstable();
    let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    // Adjacency list in traversal-length form (1/w).
    let adjacency: Vec<Vec<(usize, f64)>> = ids
        .iter()
        .map(|&id| {
            graph
                .neighbors(id)
                .map(|neighbors| {
                    neighbors
                        .iter()
                        .filter(|&(_, &w)| w > 0.0)
                        .map(|(neighbor, &w)| (index[neighbor.as_str()], 1.0 / w))
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();

    #[cfg(feature = "parallel")]
    let scores: Vec<f64> = (0..ids.len())
        .into_par_iter()
        .map(|source| closeness_from(&adjacency, source))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let scores: Vec<f64> = (0..ids.len())
        .map(|source| closeness_from(&adjacency, source))
        .collect();

    ids.into_iter()
        .map(str::to_string)
        .zip(scores)
        .collect()
}

fn closeness_from(adjacency: &[Vec<(usize, f64)>], source: usize) -> f64 {
    let dist = dijkstra(adjacency, source);

    let mut total = 0.0;
    let mut reachable = 0usize;
    for &d in &dist {
        if d.is_finite() {
            total += d;
            reachable += 1;
        }
    }

    if total > 0.0 && reachable > 1 {
        (reachable - 1) as f64 / total
    } else {
        0.0
    }
}

/// Min-heap entry; ordering is reversed so `BinaryHeap` pops smallest first.
#[derive(PartialEq)]
struct Visit {
    dist: f64,
    node: usize,
}

impl Eq for Visit {}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Visit {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

fn dijkstra(adjacency: &[Vec<(usize, f64)>], source: usize) -> Vec<f64> {
    let mut dist = vec![f64::INFINITY; adjacency.len()];
    dist[source] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(Visit {
        dist: 0.0,
        node: source,
    });

    while let Some(Visit { dist: d, node }) = heap.pop() {
        if d > dist[node] {
            continue; // stale entry
        }
        for &(neighbor, length) in &adjacency[node] {
            let candidate = d + length;
            if candidate < dist[neighbor] {
                dist[neighbor] = candidate;
                heap.push(Visit {
                    dist: candidate,
                    node: neighbor,
                });
            }
        }
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from_edges(edges: &[(&str, &str, f64)], isolated: &[&str]) -> SimilarityGraph {
        let mut graph = SimilarityGraph::new();
        for &(a, b, w) in edges {
            graph.add_edge(a, b, w);
        }
        for &id in isolated {
            graph.add_node(id);
        }
        graph
    }

    #[test]
    fn test_triangle_scores_equal_isolated_scores_zero() {
        let graph = graph_from_edges(
            &[("a", "b", 1.0), ("a", "c", 1.0), ("b", "c", 1.0)],
            &["d"],
        );
        let scores = closeness_scores(&graph);

        // Each triangle node: 2 reachable others at distance 1 → 2/2 = 1.0.
        assert_eq!(scores["a"], 1.0);
        assert_eq!(scores["a"], scores["b"]);
        assert_eq!(scores["b"], scores["c"]);
        assert_eq!(scores["d"], 0.0);
    }

    #[test]
    fn test_heavier_edges_are_shorter() {
        // a-b strongly similar, b-c weakly similar.
        let graph = graph_from_edges(&[("a", "b", 0.5), ("b", "c", 0.1)], &[]);
        let scores = closeness_scores(&graph);

        // b: d(a)=2, d(c)=10 → 2/12. a: d(b)=2, d(c)=12 → 2/14.
        assert!((scores["b"] - 2.0 / 12.0).abs() < 1e-12);
        assert!((scores["a"] - 2.0 / 14.0).abs() < 1e-12);
        assert!(scores["b"] > scores["a"]);
    }

    #[test]
    fn test_dijkstra_prefers_indirect_shortcut() {
        // Direct a-c is weight 0.05 (length 20); via b it's 2+2=4.
        let graph = graph_from_edges(
            &[("a", "b", 0.5), ("b", "c", 0.5), ("a", "c", 0.05)],
            &[],
        );
        let scores = closeness_scores(&graph);
        assert!((scores["a"] - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_components_do_not_see_each_other() {
        let graph = graph_from_edges(&[("a", "b", 1.0), ("x", "y", 1.0)], &[]);
        let scores = closeness_scores(&graph);
        // Pair components: 1 reachable other at distance 1 → 1.0 each.
        for id in ["a", "b", "x", "y"] {
            assert_eq!(scores[id], 1.0);
        }
    }

    #[test]
    fn test_empty_graph() {
        assert!(closeness_scores(&SimilarityGraph::new()).is_empty());
    }

    #[test]
    fn test_all_scores_non_negative() {
        let graph = graph_from_edges(
            &[("1", "2", 0.3), ("2", "3", 0.2), ("4", "5", 0.9)],
            &["6"],
        );
        for (_, score) in closeness_scores(&graph) {
            assert!(score >= 0.0);
        }
    }
}
