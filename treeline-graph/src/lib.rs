//! Treeline Graph - reference graph and importance scoring
//!
//! This crate turns the references collected by the analyzers into a
//! weighted directed graph and scores every node by how central it is.
//!
//! # Architecture
//!
//! - [`GraphBuilder`] resolves reference names against node names
//! - [`ReferenceGraph`] wraps petgraph with a path index
//! - [`Scorer`] picks between reference counting and PageRank
//! - [`ImportanceCalculator`] runs the whole pipeline for a node set
//!
//! # Example
//!
//! ```
//! use treeline_core::{CodeNode, NodeKind, Reference};
//! use treeline_graph::ImportanceCalculator;
//!
//! let caller = CodeNode::symbol("main", NodeKind::Function, "app.py", "main")
//!     .with_references(vec![Reference::new("helper", "app.py::main", 2, 4)]);
//! let helper = CodeNode::symbol("helper", NodeKind::Function, "app.py", "helper");
//!
//! let scores = ImportanceCalculator::default().calculate(&[&caller, &helper], &[], &[]);
//! assert_eq!(scores["app.py::helper"], 1.0);
//! ```

mod builder;
mod calculator;
mod edge;
mod error;
mod graph;
pub mod scoring;
mod symbol_table;

pub use builder::{build_graph, GraphBuilder, ResolutionStats};
pub use calculator::ImportanceCalculator;
pub use edge::{Edge, GraphEdge};
pub use error::{GraphError, Result};
pub use graph::{GraphStats, ReferenceGraph, VertexId};
pub use scoring::{PageRankScorer, ReferenceScorer, Scorer, ScorerKind};
pub use symbol_table::SymbolTable;
