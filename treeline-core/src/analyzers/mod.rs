//! Source analyzers.
//!
//! An analyzer turns the text of one file into a node subtree (usually a
//! single File node with nested symbols) with references attached. The
//! registry tries analyzers in order and uses the first one that accepts a
//! path, so a catch-all analyzer belongs at the end.

mod python;
mod text;

pub use python::PythonAnalyzer;
pub use text::TextAnalyzer;

use crate::error::{AnalyzeError, Result};
use crate::node::CodeNode;
use std::fs;
use std::path::Path;

/// Extracts nodes and references from a single file.
pub trait Analyzer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Returns true if this analyzer understands the file at `path`.
    fn can_handle(&self, path: &Path) -> bool;

    /// Analyzes in-memory content. `rel_path` is the repository-relative
    /// path and becomes the File node's identity.
    fn analyze(&self, rel_path: &str, content: &str) -> Result<Vec<CodeNode>>;

    /// Reads `path` from disk and analyzes it.
    fn analyze_file(&self, path: &Path, rel_path: &str) -> Result<Vec<CodeNode>> {
        let content = fs::read_to_string(path).map_err(|e| AnalyzeError::io(path, e))?;
        self.analyze(rel_path, &content)
    }
}

/// Ordered set of analyzers. First match wins.
pub struct AnalyzerRegistry {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl AnalyzerRegistry {
    /// Creates a registry with no analyzers.
    pub fn empty() -> Self {
        Self {
            analyzers: Vec::new(),
        }
    }

    /// Python first, plain text as the fallback.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(PythonAnalyzer::new());
        registry.register(TextAnalyzer::new());
        registry
    }

    pub fn register(&mut self, analyzer: impl Analyzer + 'static) {
        self.analyzers.push(Box::new(analyzer));
    }

    /// Finds the first analyzer that accepts `path`.
    pub fn find(&self, path: &Path) -> Option<&dyn Analyzer> {
        self.analyzers
            .iter()
            .find(|a| a.can_handle(path))
            .map(|a| a.as_ref())
    }

    /// Analyzes a file with the first matching analyzer.
    pub fn analyze_file(&self, path: &Path, rel_path: &str) -> Result<Vec<CodeNode>> {
        let analyzer = self
            .find(path)
            .ok_or_else(|| AnalyzeError::Unsupported(path.to_path_buf()))?;
        tracing::trace!(analyzer = analyzer.name(), file = rel_path, "analyzing");
        analyzer.analyze_file(path, rel_path)
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }
}

/// Returns the last `/`-separated segment of a relative path.
pub(crate) fn file_name(rel_path: &str) -> &str {
    rel_path.rsplit('/').next().unwrap_or(rel_path)
}
