use super::weight_of;
use crate::graph::ReferenceGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::trace;
use treeline_core::Scores;

/// Personalized PageRank computed by power iteration.
///
/// ```text
/// PR(v) = (1 - d) * p(v) + d * (sum over u -> v of PR(u) * w(u, v) / W(u))
///       + d * dangling * p(v)
/// ```
///
/// `p` is the teleport distribution: concentrated on the important set
/// (scaled by priority weights) when one is given, uniform otherwise.
/// `W(u)` is the total outgoing weight of `u`. The result sums to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankScorer {
    /// Probability of following an edge instead of teleporting.
    pub damping: f64,
    /// Upper bound on power iterations.
    pub max_iterations: usize,
    /// Convergence threshold per vertex; the L1 tolerance is `n * tolerance`.
    pub tolerance: f64,
}

impl Default for PageRankScorer {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

impl PageRankScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(
        &self,
        graph: &ReferenceGraph,
        important: &BTreeSet<String>,
        weights: &HashMap<String, f64>,
    ) -> Scores {
        let n = graph.node_count();
        if n == 0 {
            return Scores::new();
        }

        let teleport = self.teleport(graph, important, weights);

        let out_weight: Vec<f64> = graph
            .vertex_ids()
            .map(|id| graph.outgoing(id).map(|(_, e)| e.weight.max(0.0)).sum())
            .collect();

        let mut ranks = vec![1.0 / n as f64; n];
        let mut next = vec![0.0; n];
        let tolerance = n as f64 * self.tolerance;

        for iteration in 0..self.max_iterations {
            let dangling: f64 = graph
                .vertex_ids()
                .filter(|id| out_weight[id.index()] <= 0.0)
                .map(|id| ranks[id.index()])
                .sum();

            for id in graph.vertex_ids() {
                let followed: f64 = graph
                    .incoming(id)
                    .filter(|(source, _)| out_weight[source.index()] > 0.0)
                    .map(|(source, edge)| {
                        ranks[source.index()] * edge.weight.max(0.0) / out_weight[source.index()]
                    })
                    .sum();

                let p = teleport[id.index()];
                next[id.index()] = (1.0 - self.damping) * p
                    + self.damping * followed
                    + self.damping * dangling * p;
            }

            let delta: f64 = ranks.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
            std::mem::swap(&mut ranks, &mut next);

            if delta < tolerance {
                trace!(iterations = iteration + 1, "pagerank converged");
                break;
            }
        }

        graph
            .vertex_ids()
            .filter_map(|id| Some((graph.path(id)?.to_string(), ranks[id.index()])))
            .collect()
    }

    /// Teleport probabilities indexed by vertex, summing to one.
    fn teleport(
        &self,
        graph: &ReferenceGraph,
        important: &BTreeSet<String>,
        weights: &HashMap<String, f64>,
    ) -> Vec<f64> {
        let n = graph.node_count();
        let mut teleport = vec![0.0; n];

        for path in important {
            if let Some(id) = graph.vertex(path) {
                teleport[id.index()] = weight_of(weights, path).max(0.0);
            }
        }

        let total: f64 = teleport.iter().sum();
        if total > 0.0 {
            teleport.iter_mut().for_each(|p| *p /= total);
        } else {
            teleport.fill(1.0 / n as f64);
        }
        teleport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ReferenceGraph {
        // a → b → c, d → c
        let mut graph = ReferenceGraph::new();
        graph.add_edge("a", "b", 1.0);
        graph.add_edge("b", "c", 1.0);
        graph.add_edge("d", "c", 1.0);
        graph
    }

    #[test]
    fn test_ranks_sum_to_one() {
        let scores = PageRankScorer::default().score(&chain(), &BTreeSet::new(), &HashMap::new());
        let total: f64 = scores.values().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert_eq!(scores.len(), 4);
    }

    #[test]
    fn test_sink_ranks_highest() {
        let scores = PageRankScorer::default().score(&chain(), &BTreeSet::new(), &HashMap::new());
        assert!(scores["c"] > scores["b"]);
        assert!(scores["b"] > scores["a"]);
        assert!((scores["a"] - scores["d"]).abs() < 1e-9);
    }

    #[test]
    fn test_personalization_favors_important_neighbourhood() {
        let uniform = PageRankScorer::default().score(&chain(), &BTreeSet::new(), &HashMap::new());
        let important: BTreeSet<String> = ["d".to_string()].into_iter().collect();
        let focused = PageRankScorer::default().score(&chain(), &important, &HashMap::new());

        assert!(focused["d"] > uniform["d"]);
        assert!(focused["a"] < uniform["a"]);
    }

    #[test]
    fn test_edge_weight_steers_transitions() {
        let mut graph = ReferenceGraph::new();
        graph.add_edge("hub", "heavy", 3.0);
        graph.add_edge("hub", "light", 1.0);

        let scores = PageRankScorer::default().score(&graph, &BTreeSet::new(), &HashMap::new());
        assert!(scores["heavy"] > scores["light"]);
    }

    #[test]
    fn test_unknown_important_falls_back_to_uniform() {
        let important: BTreeSet<String> = ["ghost".to_string()].into_iter().collect();
        let uniform = PageRankScorer::default().score(&chain(), &BTreeSet::new(), &HashMap::new());
        let ghost = PageRankScorer::default().score(&chain(), &important, &HashMap::new());
        assert_eq!(uniform, ghost);
    }

    #[test]
    fn test_empty_graph() {
        let scores =
            PageRankScorer::default().score(&ReferenceGraph::new(), &BTreeSet::new(), &HashMap::new());
        assert!(scores.is_empty());
    }
}
