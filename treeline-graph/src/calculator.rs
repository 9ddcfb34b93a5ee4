//! Importance calculation.
//!
//! Ties the pieces together: build the graph from nodes, map focus paths and
//! mentioned symbols to vertices, run the configured scorer, and fill in
//! zeros for anything the scorer left out.

use crate::builder::build_graph;
use crate::scoring::Scorer;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;
use treeline_core::{CodeNode, Scores};

/// Computes importance scores for a set of nodes.
#[derive(Debug, Clone, Default)]
pub struct ImportanceCalculator {
    scorer: Scorer,
    /// Priority multipliers by node path, forwarded to the scorer.
    weights: HashMap<String, f64>,
}

impl ImportanceCalculator {
    pub fn new(scorer: Scorer) -> Self {
        Self {
            scorer,
            weights: HashMap::new(),
        }
    }

    /// Sets per-path priority multipliers.
    pub fn with_weights(mut self, weights: HashMap<String, f64>) -> Self {
        self.weights = weights;
        self
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Scores every node in `nodes`.
    ///
    /// `focused_paths` match node paths exactly. `mentioned_symbols` match a
    /// node's local name or its full path. Entries matching nothing are
    /// ignored. Every input path appears in the result.
    pub fn calculate(
        &self,
        nodes: &[&CodeNode],
        focused_paths: &[String],
        mentioned_symbols: &[String],
    ) -> Scores {
        if nodes.is_empty() {
            return Scores::new();
        }

        let graph = build_graph(nodes.iter().copied(), Vec::new());

        let mut important: BTreeSet<String> = focused_paths
            .iter()
            .filter(|p| graph.contains(p))
            .cloned()
            .collect();
        for symbol in mentioned_symbols {
            important.extend(
                nodes
                    .iter()
                    .filter(|n| &n.name == symbol || &n.path == symbol)
                    .map(|n| n.path.clone()),
            );
        }

        debug!(
            vertices = graph.node_count(),
            edges = graph.edge_count(),
            important = important.len(),
            scorer = %self.scorer.kind(),
            "scoring graph"
        );

        let mut scores = self.scorer.score(&graph, &important, &self.weights);
        for node in nodes {
            scores.entry(node.path.clone()).or_insert(0.0);
        }
        scores
    }

    /// Scores every node of the tree under `root`, including `root` itself.
    pub fn calculate_tree(
        &self,
        root: &CodeNode,
        focused_paths: &[String],
        mentioned_symbols: &[String],
    ) -> Scores {
        self.calculate(&root.descendants(), focused_paths, mentioned_symbols)
    }
}
