//! Core graph data structure.
//!
//! The ReferenceGraph wraps petgraph and indexes vertices by node path.
//! It is rebuilt for every scoring pass and never persisted.

use crate::edge::{Edge, GraphEdge};
use crate::error::{GraphError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a vertex in the graph.
pub type VertexId = NodeIndex;

/// Directed, weighted graph of resolved references between node paths.
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    /// Vertices carry the node path; edges carry accumulated weight.
    pub(crate) graph: DiGraph<String, Edge>,

    /// Maps node paths to vertex indexes.
    index: HashMap<String, VertexId>,
}

impl ReferenceGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex for `path`, returning the existing one if present.
    pub fn add_vertex(&mut self, path: impl Into<String>) -> VertexId {
        let path = path.into();
        if let Some(&id) = self.index.get(&path) {
            return id;
        }
        let id = self.graph.add_node(path.clone());
        self.index.insert(path, id);
        id
    }

    /// Adds `weight` to the edge `from -> to`, creating it if needed.
    pub fn add_reference(&mut self, from: VertexId, to: VertexId, weight: f64) {
        match self.graph.find_edge(from, to) {
            Some(edge) => {
                if let Some(existing) = self.graph.edge_weight_mut(edge) {
                    existing.accumulate(weight);
                }
            }
            None => {
                self.graph.add_edge(from, to, Edge::new(weight));
            }
        }
    }

    /// Adds a weighted edge between two paths, creating vertices as needed.
    #[cfg(test)]
    pub(crate) fn add_edge(&mut self, from: &str, to: &str, weight: f64) {
        let from = self.add_vertex(from);
        let to = self.add_vertex(to);
        self.add_reference(from, to, weight);
    }

    /// Gets the vertex for a path.
    pub fn vertex(&self, path: &str) -> Option<VertexId> {
        self.index.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Gets the path stored at a vertex.
    pub fn path(&self, id: VertexId) -> Option<&str> {
        self.graph.node_weight(id).map(String::as_str)
    }

    /// Iterates over vertex ids in insertion order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.graph.node_indices()
    }

    /// Iterates over vertex paths in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Returns the edge between two vertices, if any.
    pub fn edge(&self, from: VertexId, to: VertexId) -> Option<&Edge> {
        let edge = self.graph.find_edge(from, to)?;
        self.graph.edge_weight(edge)
    }

    /// Outgoing edges of a path as `(target, weight)`, sorted by target.
    pub fn edges_from(&self, path: &str) -> Vec<(&str, f64)> {
        let Some(id) = self.vertex(path) else {
            return Vec::new();
        };
        let mut edges: Vec<(&str, f64)> = self
            .graph
            .edges_directed(id, Direction::Outgoing)
            .filter_map(|e| Some((self.path(e.target())?, e.weight().weight)))
            .collect();
        edges.sort_by(|a, b| a.0.cmp(b.0));
        edges
    }

    /// Incoming edges of a vertex as `(source, edge)`.
    pub fn incoming(&self, id: VertexId) -> impl Iterator<Item = (VertexId, &Edge)> + '_ {
        self.graph
            .edges_directed(id, Direction::Incoming)
            .map(|e| (e.source(), e.weight()))
    }

    /// Outgoing edges of a vertex as `(target, edge)`.
    pub fn outgoing(&self, id: VertexId) -> impl Iterator<Item = (VertexId, &Edge)> + '_ {
        self.graph
            .edges_directed(id, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
    }

    /// Number of distinct vertices referencing this one. Self loops count.
    pub fn in_degree(&self, id: VertexId) -> usize {
        self.graph.edges_directed(id, Direction::Incoming).count()
    }

    /// Number of distinct vertices this one references. Self loops count.
    pub fn out_degree(&self, id: VertexId) -> usize {
        self.graph.edges_directed(id, Direction::Outgoing).count()
    }

    /// Hop counts from `source` to every reachable vertex.
    ///
    /// Every edge costs one hop regardless of weight. The source itself is
    /// included at distance zero.
    pub fn hop_distances(&self, source: &str) -> Result<HashMap<VertexId, usize>> {
        let start = self
            .vertex(source)
            .ok_or_else(|| GraphError::UnknownVertex(source.to_string()))?;
        Ok(petgraph::algo::dijkstra(&self.graph, start, None, |_| 1usize))
    }

    /// Returns the number of vertices.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns all edges with source and target paths for export.
    pub fn export_edges(&self) -> Vec<GraphEdge> {
        self.graph
            .edge_references()
            .filter_map(|edge_ref| {
                let source = self.path(edge_ref.source())?.to_string();
                let target = self.path(edge_ref.target())?.to_string();
                let edge = edge_ref.weight();
                Some(GraphEdge {
                    source,
                    target,
                    weight: edge.weight,
                    occurrences: edge.occurrences,
                })
            })
            .collect()
    }
}

/// Graph statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub self_loops: usize,
    pub isolated: usize,
}

impl ReferenceGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        let self_loops = self
            .graph
            .edge_references()
            .filter(|e| e.source() == e.target())
            .count();
        let isolated = self
            .vertex_ids()
            .filter(|&id| self.in_degree(id) == 0 && self.out_degree(id) == 0)
            .count();

        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            self_loops,
            isolated,
        }
    }
}
