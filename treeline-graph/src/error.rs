use thiserror::Error;

/// Result alias for graph queries.
pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The requested path is not a vertex of the graph.
    #[error("unknown vertex: {0}")]
    UnknownVertex(String),
}
