//! Edge types for the reference graph.
//!
//! There is at most one edge per ordered pair of vertices. Repeated
//! references between the same pair accumulate onto it.

use serde::{Deserialize, Serialize};

/// A resolved reference edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Accumulated weight of every reference folded into this edge.
    pub weight: f64,

    /// How many references were folded into this edge.
    pub occurrences: u32,
}

impl Edge {
    /// Creates an edge from a single reference.
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            occurrences: 1,
        }
    }

    /// Folds another reference into this edge.
    pub fn accumulate(&mut self, weight: f64) {
        self.weight += weight;
        self.occurrences += 1;
    }
}

/// A flattened edge for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub occurrences: u32,
}
