//! Graph builder for constructing the reference graph from code nodes.
//!
//! The builder takes CodeNodes and resolves their references into
//! weighted graph edges by matching names.

use crate::graph::{ReferenceGraph, VertexId};
use crate::symbol_table::SymbolTable;
use tracing::{debug, trace};
use treeline_core::{CodeNode, Reference};

/// Counts of how references were resolved in one build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionStats {
    /// References matching exactly one node.
    pub resolved: usize,
    /// References matching several nodes, fanned out to all of them.
    pub ambiguous: usize,
    /// References matching no node (external or builtin names).
    pub unresolved: usize,
    /// References whose source path is not a vertex.
    pub orphaned: usize,
}

/// Builds a ReferenceGraph from code nodes and references.
///
/// The builder handles the two-pass process:
/// 1. Add every node as a vertex and register its name
/// 2. Resolve references into edges once all names are known
pub struct GraphBuilder {
    graph: ReferenceGraph,
    /// Maps local names to candidate vertices.
    symbol_table: SymbolTable,
    /// References waiting for resolution.
    pending: Vec<Reference>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            graph: ReferenceGraph::new(),
            symbol_table: SymbolTable::new(),
            pending: Vec::new(),
        }
    }

    /// Adds nodes as vertices and queues their attached references.
    ///
    /// Children are not visited; pass a flattened node list.
    pub fn add_nodes<'a>(&mut self, nodes: impl IntoIterator<Item = &'a CodeNode>) {
        for node in nodes {
            let is_new = !self.graph.contains(&node.path);
            let id = self.graph.add_vertex(node.path.as_str());
            if is_new {
                self.symbol_table.insert(&node.name, &node.path, id);
            } else {
                trace!(path = %node.path, "duplicate node path, keeping first vertex");
            }
            self.pending.extend(node.references.iter().cloned());
        }
    }

    /// Queues additional references for resolution.
    pub fn add_references(&mut self, references: impl IntoIterator<Item = Reference>) {
        self.pending.extend(references);
    }

    /// Resolves queued references into edges.
    ///
    /// A name matching one node adds weight 1.0 to that edge. A name matching
    /// N nodes adds `1/N` to an edge towards each of them. Names matching
    /// nothing are dropped.
    pub fn resolve_edges(&mut self) -> ResolutionStats {
        let mut stats = ResolutionStats::default();
        let pending = std::mem::take(&mut self.pending);

        for reference in &pending {
            let Some(from) = self.graph.vertex(&reference.path) else {
                trace!(path = %reference.path, name = %reference.name, "reference from unknown node");
                stats.orphaned += 1;
                continue;
            };

            let candidates: Vec<VertexId> = self.symbol_table.resolve(&reference.name);
            match candidates.len() {
                0 => stats.unresolved += 1,
                1 => {
                    self.graph.add_reference(from, candidates[0], 1.0);
                    stats.resolved += 1;
                }
                n => {
                    let share = 1.0 / n as f64;
                    for to in candidates {
                        self.graph.add_reference(from, to, share);
                    }
                    stats.ambiguous += 1;
                }
            }
        }

        debug!(
            resolved = stats.resolved,
            ambiguous = stats.ambiguous,
            unresolved = stats.unresolved,
            orphaned = stats.orphaned,
            "resolved references"
        );
        stats
    }

    /// Finishes building and returns the graph.
    pub fn build(mut self) -> ReferenceGraph {
        self.resolve_edges();
        self.graph
    }
}

/// Builds a graph from a flat node list plus extra references.
///
/// References attached to the nodes are included as well.
pub fn build_graph<'a>(
    nodes: impl IntoIterator<Item = &'a CodeNode>,
    references: impl IntoIterator<Item = Reference>,
) -> ReferenceGraph {
    let mut builder = GraphBuilder::new();
    builder.add_nodes(nodes);
    builder.add_references(references);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use treeline_core::NodeKind;

    fn function(file: &str, name: &str) -> CodeNode {
        CodeNode::symbol(name, NodeKind::Function, file, name)
    }

    #[test]
    fn test_builder_adds_nodes() {
        let nodes = vec![function("test.py", "foo"), function("test.py", "bar")];
        let graph = build_graph(&nodes, Vec::new());

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_builder_resolves_edges() {
        let caller = function("test.py", "caller")
            .with_references(vec![Reference::new("callee", "test.py::caller", 3, 4)]);
        let callee = function("test.py", "callee");

        let graph = build_graph(&[caller, callee], Vec::new());

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.edges_from("test.py::caller"),
            vec![("test.py::callee", 1.0)]
        );
    }

    #[test]
    fn test_cross_file_resolution_from_separate_references() {
        let nodes = vec![
            CodeNode::file("main.py", "main.py"),
            function("utils.py", "helper"),
        ];
        let references = vec![Reference::new("helper", "main.py", 1, 0)];

        let graph = build_graph(&nodes, references);
        assert_eq!(graph.edges_from("main.py"), vec![("utils.py::helper", 1.0)]);
    }

    #[test]
    fn test_unresolved_and_orphaned_references_are_dropped() {
        let nodes = vec![function("a.py", "f")];
        let mut builder = GraphBuilder::new();
        builder.add_nodes(&nodes);
        builder.add_references(vec![
            Reference::new("print", "a.py::f", 2, 4),
            Reference::new("f", "ghost.py", 1, 0),
        ]);
        let stats = builder.resolve_edges();

        assert_eq!(stats.unresolved, 1);
        assert_eq!(stats.orphaned, 1);
        assert_eq!(stats.resolved, 0);
    }

    #[test]
    fn test_repeated_references_accumulate() {
        let caller = function("b.py", "h").with_references(vec![
            Reference::new("f", "b.py::h", 2, 4),
            Reference::new("f", "b.py::h", 3, 4),
        ]);
        let graph = build_graph(&[caller, function("a.py", "f")], Vec::new());

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges_from("b.py::h"), vec![("a.py::f", 2.0)]);
    }

    #[test]
    fn test_ambiguous_names_fan_out() {
        let caller = function("main.py", "main")
            .with_references(vec![Reference::new("run", "main.py::main", 1, 0)]);
        let nodes = vec![
            caller,
            function("b.py", "run"),
            function("a.py", "run"),
            function("c.py", "run"),
        ];

        let graph = build_graph(&nodes, Vec::new());
        let third = 1.0 / 3.0;
        assert_eq!(
            graph.edges_from("main.py::main"),
            vec![("a.py::run", third), ("b.py::run", third), ("c.py::run", third)]
        );
    }

    #[test]
    fn test_ambiguous_resolution_is_stable() {
        let build = |order: &[usize]| {
            let all = [
                function("x.py", "run")
                    .with_references(vec![Reference::new("run", "x.py::run", 1, 0)]),
                function("y.py", "run"),
                function("z.py", "go").with_references(vec![Reference::new("run", "z.py::go", 1, 0)]),
            ];
            let nodes: Vec<&CodeNode> = order.iter().map(|&i| &all[i]).collect();
            let graph = build_graph(nodes, Vec::new());
            let mut edges: Vec<(String, String, f64)> = graph
                .export_edges()
                .into_iter()
                .map(|e| (e.source, e.target, e.weight))
                .collect();
            edges.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
            edges
        };

        let first = build(&[0, 1, 2]);
        assert_eq!(first, build(&[0, 1, 2]));
        assert_eq!(first, build(&[2, 1, 0]));
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_self_references_are_kept() {
        let recursive = function("a.py", "walk")
            .with_references(vec![Reference::new("walk", "a.py::walk", 5, 8)]);
        let graph = build_graph(&[recursive], Vec::new());

        assert_eq!(graph.edges_from("a.py::walk"), vec![("a.py::walk", 1.0)]);
    }

    #[test]
    fn test_duplicate_paths_collapse() {
        let nodes = vec![function("a.py", "f"), function("a.py", "f")];
        let graph = build_graph(&nodes, Vec::new());
        assert_eq!(graph.node_count(), 1);
    }
}
