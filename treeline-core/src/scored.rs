//! Scores attached to an immutable tree.
//!
//! Scoring never mutates nodes. The calculator produces a `Scores` map and a
//! `ScoredTree` pairs it with the root for the serializers to read.

use crate::node::CodeNode;
use std::collections::HashMap;

/// Importance per node path, each in `[0, 1]`.
pub type Scores = HashMap<String, f64>;

/// A read-only view of a tree together with its importance scores.
#[derive(Debug, Clone, Copy)]
pub struct ScoredTree<'a> {
    root: &'a CodeNode,
    scores: &'a Scores,
}

impl<'a> ScoredTree<'a> {
    pub fn new(root: &'a CodeNode, scores: &'a Scores) -> Self {
        Self { root, scores }
    }

    pub fn root(&self) -> &'a CodeNode {
        self.root
    }

    /// Importance of a node, 0.0 when it was never scored.
    pub fn importance(&self, node: &CodeNode) -> f64 {
        self.scores.get(&node.path).copied().unwrap_or(0.0)
    }

    pub fn scores(&self) -> &'a Scores {
        self.scores
    }
}
